//! Error types for artifact generation

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of the population, merge, handler and writer stages.
///
/// Extraction never produces one of these: constructs the scanner cannot
/// recognize are simply absent from the intent model.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unsupported cloud option: {0}. Valid options: k8s, docker")]
    UnsupportedMode(String),

    #[error("Missing required field '{field}': {cause}")]
    MissingField { field: String, cause: String },

    #[error("File system error at {path}: {cause}")]
    Io { path: PathBuf, cause: String },

    #[error("Error while copying file {source_path} to {target}: {cause}")]
    CopyFile {
        source_path: String,
        target: String,
        cause: String,
    },

    #[error("Invalid override configuration: {0}")]
    InvalidOverride(String),

    #[error("Failed to parse override configuration {path}: {source}")]
    OverrideParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to load syntax tree {path}: {cause}")]
    SyntaxTree { path: PathBuf, cause: String },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl BuildError {
    pub fn missing(field: impl Into<String>, cause: impl Into<String>) -> Self {
        BuildError::MissingField {
            field: field.into(),
            cause: cause.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            cause: format!("{:#}", source),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
