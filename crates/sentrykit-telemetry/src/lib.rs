//! Structured (JSON) logging initialization shared by CLI and library
//! consumers of the guardrail evaluator.

#![deny(unsafe_code)]
#![deny(missing_docs)]

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable consulted before `RUST_LOG`; lets operators
/// tune the evaluator's own verbosity without touching every crate
/// that happens to share the process.
pub const LOG_LEVEL_ENV: &str = "SENTRYKIT_LOG_LEVEL";

fn resolve_filter() -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize JSON-formatted structured logging with env-driven
/// filtering. Idempotent: a second call is a harmless no-op if a
/// global subscriber is already installed.
pub fn init_json_logging() {
    let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
    let subscriber = Registry::default().with(resolve_filter()).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentrykit_log_level_takes_precedence() {
        std::env::set_var(LOG_LEVEL_ENV, "debug");
        std::env::set_var("RUST_LOG", "error");
        let filter = resolve_filter();
        assert_eq!(filter.to_string(), "debug");
        std::env::remove_var(LOG_LEVEL_ENV);
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    fn falls_back_to_info_with_no_env_set() {
        std::env::remove_var(LOG_LEVEL_ENV);
        std::env::remove_var("RUST_LOG");
        let filter = resolve_filter();
        assert_eq!(filter.to_string(), "info");
    }
}
