//! `tracing` subscriber setup for the binary
//!
//! Logs go to stderr; stdout carries the post-build instructions and
//! `inspect` output.

use std::env;
use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LEVEL_ENV: &str = "CLOUDPACK_LOG_LEVEL";
const JSON_ENV: &str = "CLOUDPACK_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    /// Resolves the level from the global flags
    ///
    /// `--log-level` wins, then `-v` (debug) and `-q` (error); without any of
    /// them `CLOUDPACK_LOG_LEVEL` applies. `CLOUDPACK_LOG_JSON=true` switches
    /// to JSON lines.
    pub fn from_flags(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = match log_level {
            Some(value) => parse_level(value),
            None if verbose => Level::DEBUG,
            None if quiet => Level::ERROR,
            None => env::var(LEVEL_ENV)
                .map(|value| parse_level(&value))
                .unwrap_or(Level::INFO),
        };
        let use_json = env::var(JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self { level, use_json }
    }
}

/// Parses a level name case-insensitively, falling back to INFO
pub fn parse_level(value: &str) -> Level {
    Level::from_str(value.trim()).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            value
        );
        Level::INFO
    })
}

/// Installs the global subscriber once; `RUST_LOG` overrides the level
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("cloudpack={}", config.level))
        };

        let registry = tracing_subscriber::registry().with(filter);
        if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use yare::parameterized;

    #[parameterized(
        lower = { "debug", Level::DEBUG },
        upper = { "WARN", Level::WARN },
        padded = { " trace ", Level::TRACE },
        unknown = { "verbose", Level::INFO },
        empty = { "", Level::INFO },
    )]
    fn test_parse_level(value: &str, expected: Level) {
        assert_eq!(parse_level(value), expected);
    }

    #[test]
    #[serial]
    fn test_flags_take_precedence_over_environment() {
        env::set_var(LEVEL_ENV, "trace");
        env::remove_var(JSON_ENV);

        assert_eq!(LoggingConfig::from_flags(Some("warn"), true, false).level, Level::WARN);
        assert_eq!(LoggingConfig::from_flags(None, true, false).level, Level::DEBUG);
        assert_eq!(LoggingConfig::from_flags(None, false, true).level, Level::ERROR);
        assert_eq!(LoggingConfig::from_flags(None, false, false).level, Level::TRACE);

        env::remove_var(LEVEL_ENV);
        assert_eq!(LoggingConfig::from_flags(None, false, false), LoggingConfig::default());
    }

    #[test]
    #[serial]
    fn test_json_output_from_environment() {
        env::set_var(JSON_ENV, "true");
        assert!(LoggingConfig::from_flags(None, false, false).use_json);
        env::set_var(JSON_ENV, "yes");
        assert!(!LoggingConfig::from_flags(None, false, false).use_json);
        env::remove_var(JSON_ENV);
    }
}
