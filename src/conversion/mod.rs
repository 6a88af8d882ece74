//! Conversion request builder
//!
//! Independent of the task controller: a conversion is a single request to
//! one of two engine-specific endpoints that answers with either the
//! converted document or an error. Failures stay local to the attempt so the
//! caller can pick another file and resend with the same engine and options.
//!
//! - [`options`] - Engines, spacing and formatting options
//! - [`request`] - Source files and multipart request construction
//! - [`client`] - Sending a request and classifying the response

pub mod client;
pub mod options;
pub mod request;

pub use client::{ConversionClient, ConversionOutcome};
pub use options::{
    BlockStyle, ConversionOptions, Engine, FormattingOptions, ListMarker, Spacing, SpacingConfig,
};
pub use request::{ConversionRequest, SourceFile};
