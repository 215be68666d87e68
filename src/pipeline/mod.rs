//! Build pipeline: populate, merge overrides, run handlers, write artifacts

pub mod context;
pub mod handlers;
pub mod orchestrator;
pub mod phase_trait;
pub mod populate;
pub mod writer;

pub use context::{Artifact, ArtifactKind, BuildContext, Instruction, Instructions, OutputPaths};
pub use orchestrator::{BuildOrchestrator, CloudMode};
pub use phase_trait::ArtifactHandler;
pub use populate::Populator;
pub use writer::write_artifacts;
