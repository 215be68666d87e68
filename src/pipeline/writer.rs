//! Flushes queued artifacts to the output directories

use std::path::PathBuf;

use tracing::{debug, info};

use super::context::{Artifact, BuildContext, Instructions};
use crate::error::{BuildError, BuildResult};
use crate::output::DOCKERFILE;

const SINGLE_YAML_SUFFIX: &str = ".yaml";

/// Writes every queued artifact and hands back the build instructions
///
/// Manifests are appended to existing files, the Dockerfile is replaced, and
/// missing directories are created. The queue is drained, so a second call
/// writes nothing.
pub fn write_artifacts(context: &mut BuildContext) -> BuildResult<Instructions> {
    let artifacts = std::mem::take(&mut context.artifacts);
    let single_yaml = single_yaml(context);
    debug!(count = artifacts.len(), single_yaml, "Writing artifacts");

    for artifact in &artifacts {
        let path = target_path(context, artifact, single_yaml)?;
        let fs = context.fs.as_ref();
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .map_err(|e| BuildError::io(parent, e))?;
        }
        let written = if artifact.kind.is_kubernetes() {
            fs.append(&path, &artifact.content)
        } else {
            fs.write(&path, &artifact.content)
        };
        written.map_err(|e| BuildError::io(&path, e))?;
        info!(kind = ?artifact.kind, path = %path.display(), "Wrote artifact");
    }

    Ok(std::mem::take(&mut context.instructions))
}

/// The job decides when present; the deployment only counts without a job
fn single_yaml(context: &BuildContext) -> bool {
    match (&context.job, &context.deployment) {
        (Some(job), _) => job.single_yaml,
        (None, Some(deployment)) => deployment.single_yaml,
        (None, None) => false,
    }
}

fn target_path(
    context: &BuildContext,
    artifact: &Artifact,
    single_yaml: bool,
) -> BuildResult<PathBuf> {
    let Some(suffix) = artifact.kind.suffix() else {
        return Ok(context.paths.docker.join(DOCKERFILE));
    };
    let base = context.base_name()?;
    let file_name = if single_yaml {
        format!("{}{}", base, SINGLE_YAML_SUFFIX)
    } else {
        format!("{}{}", base, suffix)
    };
    Ok(context.paths.kubernetes.join(file_name))
}
