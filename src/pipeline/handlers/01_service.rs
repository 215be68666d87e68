use tracing::debug;

use crate::error::BuildResult;
use crate::models::{ContainerPort, SVC_PROTOCOL};
use crate::output::manifest::Service;
use crate::output::to_yaml_document;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;

pub struct ServiceHandler;

impl ArtifactHandler for ServiceHandler {
    fn name(&self) -> &'static str {
        "ServiceHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        if context.services.is_empty() {
            debug!("No services to generate");
            return Ok(());
        }

        let mut content = String::new();
        for model in &context.services {
            content.push_str(&to_yaml_document(&Service::from(model))?);
        }
        register_service_ports(context)?;

        context.queue(ArtifactKind::Service, content);
        Ok(())
    }
}

/// Registers every service target port as a container port of the deployment
///
/// Must run before the Docker model is resolved so the image exposes the
/// same ports the services target.
pub fn register_service_ports(context: &mut BuildContext) -> BuildResult<()> {
    if context.services.is_empty() {
        return Ok(());
    }
    let ports: Vec<ContainerPort> = context
        .services
        .iter()
        .map(|s| ContainerPort {
            name: s.port_name.clone(),
            container_port: s.target_port,
            protocol: SVC_PROTOCOL.to_string(),
        })
        .collect();

    let deployment = context.deployment_mut()?;
    for port in ports {
        let port_number = port.container_port;
        if deployment.add_port(port) {
            debug!(port = port_number, "Registered container port");
        }
    }
    Ok(())
}
