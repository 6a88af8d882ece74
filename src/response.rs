//! Response classification
//!
//! Every HTTP response this crate receives goes through [`classify`] first.
//! The result is one of four shapes that the polling, export, conversion and
//! auth paths consume uniformly:
//!
//! | Transport status | Content type | Body                    | Class            |
//! |------------------|--------------|-------------------------|------------------|
//! | success          | JSON         | has `error`             | `JsonError`      |
//! | success          | JSON         | anything else           | `JsonSuccess`    |
//! | success          | other        | bytes                   | `Binary`         |
//! | failure          | any          | JSON with `error`       | `JsonError`      |
//! | failure          | any          | anything else           | `Unclassifiable` |
//!
//! A success response declaring JSON that does not parse is a protocol error.

use crate::error::{Error, Result};
use crate::types::DownloadedFile;
use crate::utils::filename_from_disposition;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// Classified HTTP response
#[derive(Debug)]
pub enum ResponseClass {
    /// Success status with a non-JSON body
    Binary {
        /// Response body
        bytes: Bytes,
        /// Filename suggested by Content-Disposition
        filename: Option<String>,
        /// Declared content type
        content_type: Option<String>,
    },
    /// Success status with a JSON body carrying no error
    JsonSuccess(serde_json::Value),
    /// JSON body carrying an error message
    ///
    /// `status` is `None` for soft failures (success transport status).
    JsonError {
        /// HTTP status code, if it was not a success
        status: Option<u16>,
        /// The server's message
        message: String,
    },
    /// Failure status without a usable JSON error body
    Unclassifiable {
        /// HTTP status code
        status: StatusCode,
    },
}

impl ResponseClass {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseClass::Binary { .. } => "binary",
            ResponseClass::JsonSuccess(_) => "json_success",
            ResponseClass::JsonError { .. } => "json_error",
            ResponseClass::Unclassifiable { .. } => "unclassifiable",
        }
    }

    /// Require a JSON success body
    ///
    /// A binary body is a protocol error and is never parsed.
    pub fn into_json(self) -> Result<serde_json::Value> {
        match self {
            ResponseClass::JsonSuccess(value) => Ok(value),
            ResponseClass::JsonError { status, message } => Err(Error::Server { status, message }),
            ResponseClass::Unclassifiable { status } => Err(Error::transport(status)),
            ResponseClass::Binary { .. } => Err(Error::Protocol("non-JSON response".to_string())),
        }
    }

    /// Require a non-empty binary document
    ///
    /// `fallback_name` is used when the response suggests no filename.
    pub fn into_document(self, fallback_name: impl FnOnce() -> String) -> Result<DownloadedFile> {
        match self {
            ResponseClass::Binary { bytes, .. } if bytes.is_empty() => Err(Error::EmptyOutput),
            ResponseClass::Binary {
                bytes, filename, ..
            } => Ok(DownloadedFile {
                bytes,
                filename: filename.unwrap_or_else(fallback_name),
            }),
            ResponseClass::JsonError { status, message } => Err(Error::Server { status, message }),
            ResponseClass::JsonSuccess(_) => Err(Error::Protocol(
                "expected a document but received JSON without an error message".to_string(),
            )),
            ResponseClass::Unclassifiable { status } => Err(Error::transport(status)),
        }
    }
}

/// Classify a response, consuming its body
pub async fn classify(response: reqwest::Response) -> Result<ResponseClass> {
    classify_with(response, false).await
}

/// Classify a task status response
///
/// A success body with its own string `status` is `JsonSuccess` even when it
/// also carries an `error` field, so the task's reported state decides.
pub async fn classify_status(response: reqwest::Response) -> Result<ResponseClass> {
    classify_with(response, true).await
}

async fn classify_with(response: reqwest::Response, status_first: bool) -> Result<ResponseClass> {
    let status = response.status();

    if !status.is_success() {
        // The body may be an HTML error page; only a JSON error message counts.
        let body = response.bytes().await?;
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .as_ref()
            .and_then(error_message);
        return Ok(match message {
            Some(message) => ResponseClass::JsonError {
                status: Some(status.as_u16()),
                message,
            },
            None => ResponseClass::Unclassifiable { status },
        });
    }

    if is_json(response.headers()) {
        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| Error::Protocol(format!("invalid JSON response: {}", e)))?;
        if status_first && value.get("status").is_some_and(serde_json::Value::is_string) {
            return Ok(ResponseClass::JsonSuccess(value));
        }
        return Ok(match error_message(&value) {
            Some(message) => ResponseClass::JsonError {
                status: None,
                message,
            },
            None => ResponseClass::JsonSuccess(value),
        });
    }

    let filename = filename_from_disposition(response.headers());
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;

    Ok(ResponseClass::Binary {
        bytes,
        filename,
        content_type,
    })
}

/// Whether the declared content type is JSON (`application/json` or `*+json`)
pub(crate) fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

/// The error message carried by a JSON body, if any
///
/// Accepts `{"error": "..."}` and `{"error": {"message": "..."}}`.
fn error_message(value: &serde_json::Value) -> Option<String> {
    let error = value.get("error")?;
    let message = match error {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Object(obj) => obj.get("message")?.as_str()?,
        _ => return None,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}
