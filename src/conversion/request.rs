//! Source files and the one-shot conversion request

use super::options::{ConversionOptions, Engine};
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// A document selected for conversion
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    name: String,
    bytes: Bytes,
    mime: String,
}

impl SourceFile {
    /// Wrap in-memory content, guessing the MIME type from `name`
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name).to_string();
        Self {
            name,
            bytes: bytes.into(),
            mime,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("'{}' has no usable file name", path.display()))
            })?;
        Ok(Self::new(name, bytes))
    }

    /// Override the guessed MIME type
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    /// File name as selected
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File content
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// MIME type sent with the file part
    pub fn mime(&self) -> &str {
        &self.mime
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("file name must not be empty".to_string()));
        }
        if self.bytes.is_empty() {
            return Err(Error::InvalidInput(format!("'{}' is empty", self.name)));
        }
        self.part()?;
        Ok(())
    }

    /// The multipart file part
    fn part(&self) -> Result<Part> {
        Part::bytes(self.bytes.to_vec())
            .file_name(self.name.clone())
            .mime_str(&self.mime)
            .map_err(|_| Error::InvalidInput(format!("invalid MIME type '{}'", self.mime)))
    }
}

fn guess_mime(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("md" | "markdown") => "text/markdown",
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// One conversion attempt: a single file, an engine and the option bundle
///
/// A request has no server-side identity. After a failure, swap the file with
/// [`ConversionRequest::with_file`] and send again; the engine and options
/// are kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRequest {
    file: SourceFile,
    engine: Engine,
    options: ConversionOptions,
}

impl ConversionRequest {
    /// Validate the inputs and build a request
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for a nameless or empty file, or for option
    /// values out of range when `engine` will apply them.
    pub fn build(file: SourceFile, engine: Engine, options: ConversionOptions) -> Result<Self> {
        file.validate()?;
        options.validate_for(engine)?;
        Ok(Self {
            file,
            engine,
            options,
        })
    }

    /// Replace the file, keeping engine and options
    pub fn with_file(self, file: SourceFile) -> Result<Self> {
        file.validate()?;
        Ok(Self { file, ..self })
    }

    /// Selected file
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// Selected engine
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Option bundle
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Text fields of the multipart body, in wire order
    ///
    /// The spacing map and formatting options travel as embedded JSON so the
    /// option schema can evolve without new form fields.
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("engine", self.engine.tag().to_string()),
            ("spacing", serde_json::to_string(&self.options.spacing)?),
            (
                "use_default_formatting",
                self.options.use_engine_default_formatting.to_string(),
            ),
            ("options", serde_json::to_string(&self.options.formatting)?),
        ])
    }

    /// Build the multipart body
    pub fn to_form(&self) -> Result<Form> {
        let file = self.file.part()?;

        let form = self
            .text_fields()?
            .into_iter()
            .fold(Form::new().part(FILE_FIELD, file), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }
}
