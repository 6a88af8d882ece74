//! Error types for analyzer-client
//!
//! This module provides the error taxonomy shared by the task lifecycle
//! controller, the conversion client and the auth client:
//! - Protocol-level failures (wrong content type, unparseable JSON)
//! - Transport failures without a usable JSON error body
//! - Server-reported errors, including soft failures delivered with a 2xx status
//! - Lifecycle errors (missing result, superseded task, closed auth gate)
//!
//! Every variant is terminal for the operation in progress. Nothing in this
//! crate retries automatically.

use crate::types::TaskId;
use thiserror::Error;

/// Result type alias for analyzer-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for analyzer-client
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input or server rejection at submit time
    #[error("submission failed: {0}")]
    Submission(String),

    /// Response shape violates the expected contract
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Non-success status with no usable JSON error body
    #[error("transport error: HTTP {status} {reason}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status code
        reason: String,
    },

    /// The server reported an error message in a JSON body
    ///
    /// `status` is `None` for soft failures where the transport status was a
    /// success but the body still carried an error.
    #[error("server error: {message}")]
    Server {
        /// HTTP status code, if it was not a success
        status: Option<u16>,
        /// The server's message, verbatim
        message: String,
    },

    /// Task reported completed without a result payload
    #[error("task {task_id} completed without a result")]
    MissingResult {
        /// The task that completed
        task_id: TaskId,
    },

    /// Binary success response with an empty body
    #[error("server returned an empty document")]
    EmptyOutput,

    /// Submission refused because the auth gate is closed
    #[error("not authorized to submit tasks")]
    NotAuthorized,

    /// The handle no longer refers to the active task
    #[error("task {task_id} is no longer the active task")]
    TaskSuperseded {
        /// The stale task
        task_id: TaskId,
    },

    /// Another status check for the same task has not resolved yet
    #[error("a status check for task {task_id} is already in flight")]
    PollInFlight {
        /// The task being checked
        task_id: TaskId,
    },

    /// Invalid conversion input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Network error (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging initialisation error
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Errors raised while installing the tracing subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber is already installed
    #[error("logger has already been initialized")]
    AlreadyInitialized,

    /// Any other subscriber failure
    #[error("failed to initialize logger: {0}")]
    InitializationFailed(String),
}

impl Error {
    /// Build a transport error from a status code, using its canonical reason phrase
    pub(crate) fn transport(status: reqwest::StatusCode) -> Self {
        Error::Transport {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Submission(_) => "submission_error",
            Error::Protocol(_) => "protocol_error",
            Error::Transport { .. } => "transport_error",
            Error::Server { .. } => "server_error",
            Error::MissingResult { .. } => "missing_result",
            Error::EmptyOutput => "empty_output",
            Error::NotAuthorized => "not_authorized",
            Error::TaskSuperseded { .. } => "task_superseded",
            Error::PollInFlight { .. } => "poll_in_flight",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::Logging(_) => "logging_error",
        }
    }

    /// Human-readable message for the presentation layer
    ///
    /// Server messages are returned verbatim. Transport errors collapse to
    /// `"HTTP <code> <reason>"`.
    pub fn user_message(&self) -> String {
        match self {
            Error::Submission(message) | Error::Protocol(message) => message.clone(),
            Error::Server { message, .. } => message.clone(),
            Error::Transport { status, reason } => format!("HTTP {} {}", status, reason),
            Error::Network(e) if e.is_timeout() => "request timed out".to_string(),
            Error::Network(e) if e.is_connect() => "could not connect to server".to_string(),
            Error::Network(_) => "network request failed".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the error ends the active task's polling loop
    ///
    /// `TaskSuperseded` and `PollInFlight` are reported to the caller of the
    /// rejected poll but never touch the active task.
    pub fn ends_active_task(&self) -> bool {
        !matches!(
            self,
            Error::TaskSuperseded { .. } | Error::PollInFlight { .. }
        )
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(Error, &'static str)> {
        vec![
            (Error::Submission("empty".into()), "submission_error"),
            (Error::Protocol("non-JSON response".into()), "protocol_error"),
            (
                Error::Transport {
                    status: 502,
                    reason: "Bad Gateway".into(),
                },
                "transport_error",
            ),
            (
                Error::Server {
                    status: None,
                    message: "bad markdown".into(),
                },
                "server_error",
            ),
            (
                Error::MissingResult {
                    task_id: TaskId::from("abc123"),
                },
                "missing_result",
            ),
            (Error::EmptyOutput, "empty_output"),
            (Error::NotAuthorized, "not_authorized"),
            (
                Error::TaskSuperseded {
                    task_id: TaskId::from("old"),
                },
                "task_superseded",
            ),
            (
                Error::PollInFlight {
                    task_id: TaskId::from("t1"),
                },
                "poll_in_flight",
            ),
            (Error::InvalidInput("no file".into()), "invalid_input"),
            (
                Error::Config {
                    message: "bad".into(),
                    key: Some("base_url".into()),
                },
                "config_error",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                "io_error",
            ),
            (
                Error::Logging(LoggingError::AlreadyInitialized),
                "logging_error",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, expected) in all_error_variants() {
            assert_eq!(error.error_code(), expected, "wrong code for {:?}", error);
        }
    }

    #[test]
    fn transport_error_uses_canonical_reason_phrase() {
        let error = Error::transport(reqwest::StatusCode::BAD_GATEWAY);

        assert_eq!(error.user_message(), "HTTP 502 Bad Gateway");
        assert_eq!(error.to_string(), "transport error: HTTP 502 Bad Gateway");
    }

    #[test]
    fn server_message_is_surfaced_verbatim() {
        let error = Error::Server {
            status: Some(404),
            message: "Задача не найдена".into(),
        };

        assert_eq!(error.user_message(), "Задача не найдена");
    }

    #[test]
    fn missing_result_message_names_the_task() {
        let error = Error::MissingResult {
            task_id: TaskId::from("abc123"),
        };

        assert_eq!(error.user_message(), "task abc123 completed without a result");
    }

    #[test]
    fn only_rejected_polls_leave_active_task_alone() {
        for (error, _) in all_error_variants() {
            let rejected = matches!(
                error,
                Error::TaskSuperseded { .. } | Error::PollInFlight { .. }
            );
            assert_eq!(error.ends_active_task(), !rejected);
        }
    }
}
