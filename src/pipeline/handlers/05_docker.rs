use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{BuildError, BuildResult};
use crate::fs::copy_file_or_directory;
use crate::output::render_dockerfile;
use crate::pipeline::context::{ArtifactKind, BuildContext};
use crate::pipeline::phase_trait::ArtifactHandler;

/// Stages the Docker build directory and queues the Dockerfile
pub struct DockerHandler;

impl ArtifactHandler for DockerHandler {
    fn name(&self) -> &'static str {
        "DockerHandler"
    }

    fn create_artifacts(&self, context: &mut BuildContext) -> BuildResult<()> {
        let docker = context.docker.as_ref().ok_or_else(|| {
            BuildError::missing("docker", "the Docker model was not resolved before rendering")
        })?;
        let fs = context.fs.as_ref();
        let docker_dir = &context.paths.docker;

        fs.create_dir_all(docker_dir)
            .map_err(|e| BuildError::io(docker_dir, e))?;

        if fs.is_file(&context.executable) {
            let target = docker_dir.join(&docker.jar_file_name);
            fs.copy_file(&context.executable, &target)
                .map_err(|e| copy_error(&context.executable, &target, e))?;
            debug!(jar = %target.display(), "Staged executable");
        } else {
            warn!(
                executable = %context.executable.display(),
                "Executable not found; the Dockerfile expects it next to it"
            );
        }

        for (copy, staged) in docker.staged_copy_files() {
            let source = Path::new(&copy.source);
            let target = docker_dir.join(&staged);
            copy_file_or_directory(fs, source, &target)
                .map_err(|e| copy_error(source, &target, e))?;
            debug!(source = %copy.source, staged = %staged, target = %copy.target, "Staged copy file");
        }

        info!(
            image = %docker.image_reference(),
            ports = docker.ports.len(),
            copy_files = docker.copy_files.len(),
            "Generated Dockerfile"
        );
        let content = render_dockerfile(docker);
        context.queue(ArtifactKind::Dockerfile, content);
        Ok(())
    }
}

fn copy_error(source: &Path, target: &Path, cause: anyhow::Error) -> BuildError {
    BuildError::CopyFile {
        source_path: source.display().to_string(),
        target: target.display().to_string(),
        cause: format!("{:#}", cause),
    }
}
