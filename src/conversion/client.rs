//! Sending conversion requests

use super::options::Engine;
use super::request::ConversionRequest;
use crate::config::Config;
use crate::error::Result;
use crate::response::classify;
use crate::types::DownloadedFile;
use crate::utils::default_output_name;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one conversion attempt, as shown to the user
#[derive(Clone, Debug, PartialEq)]
pub enum ConversionOutcome {
    /// The converted document
    Downloaded(DownloadedFile),
    /// The attempt failed; the request can be resent with a new file
    Failed {
        /// Machine-readable error code
        code: String,
        /// Human-readable message
        message: String,
    },
}

impl ConversionOutcome {
    /// Whether a document was produced
    pub fn is_downloaded(&self) -> bool {
        matches!(self, ConversionOutcome::Downloaded(_))
    }
}

/// Client for the two conversion endpoints
#[derive(Clone)]
pub struct ConversionClient {
    config: Arc<Config>,
    http: reqwest::Client,
}

impl ConversionClient {
    /// Create a client for the configured server
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = config.http_client()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Endpoint URL for `engine`
    pub fn endpoint(&self, engine: Engine) -> String {
        let endpoints = &self.config.endpoints;
        let path = match engine {
            Engine::Primary => &endpoints.convert_path,
            Engine::Alternate => &endpoints.convert_alternate_path,
        };
        self.config.endpoint_url(path)
    }

    /// Send the request once and report the outcome
    ///
    /// Failures never retry and never affect anything outside this call.
    pub async fn send(&self, request: &ConversionRequest) -> ConversionOutcome {
        match self.try_send(request).await {
            Ok(file) => ConversionOutcome::Downloaded(file),
            Err(e) => ConversionOutcome::Failed {
                code: e.error_code().to_string(),
                message: e.user_message(),
            },
        }
    }

    /// Send the request once, returning the document or the error
    ///
    /// A JSON body is an error even with a success status; only a non-empty
    /// binary body is a converted document.
    pub async fn try_send(&self, request: &ConversionRequest) -> Result<DownloadedFile> {
        let engine = request.engine();
        let input_name = request.file().name();

        let result = async {
            let form = request.to_form()?;
            let response = self
                .http
                .post(self.endpoint(engine))
                .multipart(form)
                .send()
                .await?;

            let output = &self.config.output;
            classify(response).await?.into_document(|| {
                default_output_name(input_name, &output.converted_suffix, &output.output_extension)
            })
        }
        .await;

        match &result {
            Ok(file) => info!(
                engine = %engine,
                input = input_name,
                filename = %file.filename,
                bytes = file.len(),
                "conversion finished"
            ),
            Err(e) => warn!(engine = %engine, input = input_name, error = %e, "conversion failed"),
        }
        result
    }
}
