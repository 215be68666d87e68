//! Configuration management for cloudpack
//!
//! Settings are loaded from environment variables with sensible defaults and
//! can be overridden by command-line flags. Per-project deployment settings
//! live in `Cloud.toml` instead (see [`crate::overrides`]).
//!
//! # Environment Variables
//!
//! - `CLOUDPACK_OUTPUT_DIR`: Output root for generated artifacts - default: "target"
//! - `CLOUDPACK_CLOUD`: Build mode (k8s|docker) - default: "k8s"
//! - `CLOUDPACK_BASE_IMAGE`: Base image for generated Dockerfiles - default: "eclipse-temurin:17-jre"
//! - `CLOUDPACK_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use cloudpack::GeneratorConfig;
//! use std::env;
//!
//! env::set_var("CLOUDPACK_CLOUD", "docker");
//!
//! let config = GeneratorConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::models::DEFAULT_BASE_IMAGE;
use crate::pipeline::CloudMode;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_OUTPUT_DIR: &str = "target";
const DEFAULT_CLOUD: &str = "k8s";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Build mode is not one of the supported values
    #[error("Invalid cloud option: {0}. Valid options: k8s, docker")]
    InvalidCloud(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Tool-level settings for one cloudpack invocation
///
/// `Default::default()` loads `CLOUDPACK_*` environment variables and falls
/// back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Root directory for `kubernetes/` and `docker/` outputs
    pub output_dir: PathBuf,

    /// Build mode name, parsed by [`GeneratorConfig::mode`]
    pub cloud: String,

    /// Base image used when `Cloud.toml` does not set one
    pub base_image: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let output_dir = env::var("CLOUDPACK_OUTPUT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let cloud = env::var("CLOUDPACK_CLOUD")
            .unwrap_or_else(|_| DEFAULT_CLOUD.to_string())
            .to_lowercase();

        let base_image = env::var("CLOUDPACK_BASE_IMAGE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_IMAGE.to_string());

        let log_level = env::var("CLOUDPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            output_dir,
            cloud,
            base_image,
            log_level,
        }
    }
}

impl GeneratorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the build mode, base image or log level is
    /// unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mode()?;

        if self.base_image.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Base image cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn mode(&self) -> Result<CloudMode, ConfigError> {
        self.cloud
            .parse()
            .map_err(|_| ConfigError::InvalidCloud(self.cloud.clone()))
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "output_dir".to_string(),
            self.output_dir.display().to_string(),
        );
        map.insert("cloud".to_string(), self.cloud.clone());
        map.insert("base_image".to_string(), self.base_image.clone());
        map.insert("log_level".to_string(), self.log_level.clone());
        map
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cloudpack Configuration:")?;
        writeln!(f, "  Output Dir: {}", self.output_dir.display())?;
        writeln!(f, "  Cloud: {}", self.cloud)?;
        writeln!(f, "  Base Image: {}", self.base_image)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
