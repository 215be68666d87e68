use super::context::BuildContext;
use crate::error::BuildResult;

/// One stage of artifact generation
///
/// Handlers run in a fixed order per build mode. Each reads the models on the
/// context, may amend them for later handlers, and queues at most one artifact.
pub trait ArtifactHandler {
    fn name(&self) -> &'static str;

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()>;
}
