use std::sync::Arc;

use tracing::debug;

use crate::error::{BuildError, BuildResult};
use crate::output::manifest::Deployment;
use crate::output::to_yaml_document;
use crate::overrides::resolve_docker_model;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;
use crate::util::is_blank;

pub struct DeploymentHandler;

impl ArtifactHandler for DeploymentHandler {
    fn name(&self) -> &'static str {
        "DeploymentHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        let fs = Arc::clone(&context.fs);
        let jar_file_name = context.jar_file_name();
        let deployment = context
            .deployment
            .as_mut()
            .ok_or_else(|| BuildError::missing("deployment", "no deployment model to render"))?;

        if is_blank(Some(&deployment.name)) {
            return Err(BuildError::missing(
                "deployment.name",
                "artifact name could not be derived from the executable",
            ));
        }
        if is_blank(Some(&deployment.image)) {
            return Err(BuildError::missing(
                "deployment.image",
                format!("no image set for {}", deployment.name),
            ));
        }

        let docker = resolve_docker_model(
            deployment,
            context.overrides.as_ref(),
            &jar_file_name?,
            fs.as_ref(),
        )?;
        debug!(
            deployment = %deployment.name,
            image = %deployment.image,
            ports = deployment.ports.len(),
            "Rendering deployment"
        );

        let content = to_yaml_document(&Deployment::from(&*deployment))?;
        context.docker = Some(docker);
        context.queue(ArtifactKind::Deployment, content);
        Ok(())
    }
}
