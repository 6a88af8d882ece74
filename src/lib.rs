//! # analyzer-client
//!
//! Client library for a server that runs long website analyses and converts
//! markup documents into binary documents.
//!
//! ## Design Philosophy
//!
//! analyzer-client is designed to be:
//! - **Defensive** - Every response is classified before it is trusted
//! - **Single-task** - One active analysis at a time; a new submission supersedes the old one
//! - **Library-first** - No UI, the presentation layer consumes events and outcomes
//! - **Event-driven** - Consumers subscribe to task events instead of polling themselves
//!
//! ## Quick Start
//!
//! ```no_run
//! use analyzer_client::{Config, TaskController, TaskEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = TaskController::new(Config::with_base_url("http://127.0.0.1:5000"))?;
//!
//!     let mut events = controller.subscribe();
//!     controller.submit("example.com").await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             TaskEvent::Progress { progress, message, .. } => {
//!                 println!("{progress}% {}", message.unwrap_or_default())
//!             }
//!             TaskEvent::Completed { result, cost, .. } => {
//!                 println!("cost {cost}\n{result}");
//!                 break;
//!             }
//!             TaskEvent::Failed { message, .. } => {
//!                 eprintln!("failed: {message}");
//!                 break;
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Authentication client and submission gate
pub mod auth;
/// Configuration types
pub mod config;
/// Conversion request builder and client
pub mod conversion;
/// Error types
pub mod error;
/// Tracing subscriber initialisation
pub mod logging;
/// Monotonic progress tracking
pub mod progress;
/// Response classification
pub mod response;
/// Task lifecycle controller (decomposed into focused submodules)
pub mod tasks;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthClient, AuthGate, AuthStatus};
pub use config::{Config, LogFormat, LoggingConfig};
pub use conversion::{
    ConversionClient, ConversionOptions, ConversionOutcome, ConversionRequest, Engine,
    SourceFile,
};
pub use error::{Error, LoggingError, Result};
pub use response::ResponseClass;
pub use tasks::{TaskController, TaskHandle};
pub use types::{
    Cost, DownloadedFile, LifecycleState, TaskEvent, TaskId, TaskSnapshot, TaskStatus,
};
