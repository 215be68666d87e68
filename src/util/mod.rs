//! Utility modules for cloudpack
//!
//! - Structured logging setup
//! - Name sanitizing for generated Kubernetes objects

pub mod logging;
pub mod names;

pub use logging::{init_logging, LoggingConfig};
pub use names::{extract_artifact_name, is_blank, valid_name};
