//! cloudpack - deployment artifact generator for service modules
//!
//! This library reads the syntax tree of a service module, recognizes the
//! network listeners, services and scheduled tasks it declares, and writes
//! the Kubernetes manifests and Dockerfile needed to run it.
//!
//! # Core Concepts
//!
//! - **Intent**: what the module declares, as found by the [`extractors`]
//! - **Models**: deployment, service, job and image descriptions built from
//!   the intent and refined by `Cloud.toml` ([`overrides`])
//! - **Handlers**: ordered [`pipeline`] stages that render each artifact
//!
//! # Example Usage
//!
//! ```ignore
//! use cloudpack::{BuildContext, BuildOrchestrator, CloudMode, Extractor, ModulePart};
//! use cloudpack::fs::RealFileSystem;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = Arc::new(RealFileSystem::new());
//! let module = ModulePart::load(fs.as_ref(), Path::new("tree.json"))?;
//! let intent = Extractor::new().extract(&module);
//!
//! let mut context = BuildContext::new(fs, "target/bin/hello.jar", "target", None);
//! let instructions = BuildOrchestrator::new(CloudMode::Kubernetes).execute(&intent, &mut context)?;
//! print!("{}", instructions);
//! ```
//!
//! # Project Structure
//!
//! - [`syntax`]: serde model of the input syntax tree
//! - [`extractors`]: pattern recognition producing the intent
//! - [`models`]: target models and naming constants
//! - [`overrides`]: `Cloud.toml` parsing and merging
//! - [`pipeline`]: population, handlers, orchestration and writing
//! - [`output`]: manifest and Dockerfile rendering

pub mod cli;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fs;
pub mod models;
pub mod output;
pub mod overrides;
pub mod pipeline;
pub mod progress;
pub mod syntax;
pub mod util;

pub use config::{ConfigError, GeneratorConfig};
pub use error::{BuildError, BuildResult};
pub use extractors::{DeploymentIntent, Extractor};
pub use overrides::CloudToml;
pub use pipeline::{BuildContext, BuildOrchestrator, CloudMode, Instructions};
pub use syntax::ModulePart;
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
