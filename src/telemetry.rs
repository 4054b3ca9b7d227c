//! Tracing setup for binaries and tests.
//!
//! Library code only emits events; the caller builds a subscriber here and
//! decides whether to install it globally (`init`) or scope it
//! (`tracing::subscriber::with_default`).

use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "PROFIT_LOG_JSON";
pub const DEFAULT_FILTER: &str = "profit_router=info,router=info,revenue=warn,engine=info,scheduler=info,export=info,config=info,warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// `PROFIT_LOG_JSON=1` selects JSON lines.
    pub fn from_env() -> Self {
        match std::env::var(ENV_LOG_JSON).ok().as_deref() {
            Some("1") | Some("true") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build a subscriber without installing it. `RUST_LOG` wins over `DEFAULT_FILTER`.
pub fn subscriber(format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Compact => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(true)),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json()),
        ),
    }
}

/// Install the subscriber globally. Safe to call more than once; later calls are no-ops.
pub fn init(format: LogFormat) {
    let _ = tracing::subscriber::set_global_default(subscriber(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn format_from_env() {
        std::env::remove_var(ENV_LOG_JSON);
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);
        std::env::set_var(ENV_LOG_JSON, "1");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);
        std::env::remove_var(ENV_LOG_JSON);
    }

    #[test]
    fn scoped_subscriber_captures_router_events() {
        let sub = subscriber(LogFormat::Compact);
        tracing::subscriber::with_default(sub, || {
            let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 9)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap();
            let d = crate::router::route("Cats", "lifestyle", now);
            assert_eq!(d.score, 7.0);
        });
    }
}
