use tracing::debug;

use crate::error::BuildResult;
use crate::output::manifest::HorizontalPodAutoscaler;
use crate::output::to_yaml_document;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;

pub struct HpaHandler;

impl ArtifactHandler for HpaHandler {
    fn name(&self) -> &'static str {
        "HpaHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        let Some(deployment) = context.deployment.as_ref() else {
            return Ok(());
        };
        let Some(autoscaler) = deployment.autoscaler.as_ref() else {
            debug!("Autoscaling disabled");
            return Ok(());
        };

        let content = to_yaml_document(&HorizontalPodAutoscaler::new(autoscaler, deployment))?;
        context.queue(ArtifactKind::Autoscaler, content);
        Ok(())
    }
}
