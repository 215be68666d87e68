use tracing::debug;

use crate::error::BuildResult;
use crate::output::manifest::PersistentVolumeClaim;
use crate::output::to_yaml_document;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;

pub struct PersistentVolumeClaimHandler;

impl ArtifactHandler for PersistentVolumeClaimHandler {
    fn name(&self) -> &'static str {
        "PersistentVolumeClaimHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        let Some(deployment) = context.deployment.as_ref() else {
            return Ok(());
        };
        if deployment.volume_claims.is_empty() {
            debug!("No volume claims to generate");
            return Ok(());
        }

        let mut content = String::new();
        for claim in &deployment.volume_claims {
            content.push_str(&to_yaml_document(&PersistentVolumeClaim::from(claim))?);
        }
        context.queue(ArtifactKind::VolumeClaim, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::models::PersistentVolumeClaimModel;
    use crate::pipeline::handlers::test_support::{context_with, deployment};
    use std::sync::Arc;

    fn claim(name: &str) -> PersistentVolumeClaimModel {
        PersistentVolumeClaimModel {
            name: name.to_string(),
            mount_path: format!("/home/{}", name),
            size: "2Gi".to_string(),
            access_mode: "ReadWriteOnce".to_string(),
            read_only: false,
        }
    }

    #[test]
    fn test_claims_share_one_artifact() {
        let mut ctx = context_with(Arc::new(MockFileSystem::new()));
        let mut model = deployment();
        model.volume_claims = vec![claim("data"), claim("logs")];
        ctx.deployment = Some(model);

        PersistentVolumeClaimHandler.create_artifacts(&mut ctx).unwrap();

        assert_eq!(ctx.artifacts.len(), 1);
        let content = &ctx.artifacts[0].content;
        assert_eq!(content.matches("kind: PersistentVolumeClaim").count(), 2);
        assert!(content.contains("storage: 2Gi"));
    }

    #[test]
    fn test_no_claims_queue_nothing() {
        let mut ctx = context_with(Arc::new(MockFileSystem::new()));
        ctx.deployment = Some(deployment());
        PersistentVolumeClaimHandler.create_artifacts(&mut ctx).unwrap();
        assert!(ctx.artifacts.is_empty());
    }
}
