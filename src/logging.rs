//! Tracing subscriber initialisation
//!
//! The library only emits `tracing` events. Binaries that want them on
//! stderr call [`init`] once at startup.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber built from `cfg`
///
/// # Errors
///
/// - [`LoggingError::InvalidLevel`] if `cfg.level` is not a valid filter directive
/// - [`LoggingError::AlreadyInitialized`] if a global subscriber is already set
///
/// # Examples
///
/// ```no_run
/// use analyzer_client::config::LoggingConfig;
///
/// analyzer_client::logging::init(&LoggingConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init(cfg: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = mk_filter(&cfg.level)?;

    match cfg.format {
        LogFormat::Text => {
            let layer = fmt::layer().with_target(cfg.with_targets);
            init_with(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets);
            init_with(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(level).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

fn init_with<S>(subscriber: S) -> Result<(), LoggingError>
where
    S: Subscriber + Send + Sync + 'static,
{
    if tracing::dispatcher::has_been_set() {
        return Err(LoggingError::AlreadyInitialized);
    }
    subscriber
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_rejected_before_install() {
        let cfg = LoggingConfig {
            level: "analyzer_client=loud".to_string(),
            ..Default::default()
        };

        match init(&cfg) {
            Err(LoggingError::InvalidLevel(level)) => assert_eq!(level, "analyzer_client=loud"),
            other => panic!("expected invalid level, got {:?}", other),
        }
    }

    #[test]
    fn directives_are_accepted() {
        for level in ["info", "warn,analyzer_client=debug", "trace"] {
            assert!(mk_filter(level).is_ok(), "rejected {}", level);
        }
    }
}
