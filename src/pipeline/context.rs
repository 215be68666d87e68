//! Per-build state threaded through the pipeline stages

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{BuildError, BuildResult};
use crate::fs::FileSystem;
use crate::models::{DeploymentModel, DockerModel, JobModel, ServiceModel, Workload};
use crate::overrides::CloudToml;
use crate::util::{extract_artifact_name, names::EXECUTABLE_SUFFIX};

pub const KUBERNETES_DIR: &str = "kubernetes";
pub const DOCKER_DIR: &str = "docker";

/// Where generated artifacts land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub kubernetes: PathBuf,
    pub docker: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            kubernetes: root.join(KUBERNETES_DIR),
            docker: root.join(DOCKER_DIR),
            root,
        }
    }
}

/// Resource kind of a queued artifact; decides the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Service,
    VolumeClaim,
    Deployment,
    Autoscaler,
    Job,
    Dockerfile,
}

impl ArtifactKind {
    /// File suffix appended to the base name for Kubernetes artifacts
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::Service => Some("_svc.yaml"),
            ArtifactKind::VolumeClaim => Some("_volume_claim.yaml"),
            ArtifactKind::Deployment => Some("_deployment.yaml"),
            ArtifactKind::Autoscaler => Some("_hpa.yaml"),
            ArtifactKind::Job => Some("_job.yaml"),
            ArtifactKind::Dockerfile => None,
        }
    }

    pub fn is_kubernetes(&self) -> bool {
        self.suffix().is_some()
    }
}

/// Rendered artifact waiting for the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub content: String,
}

/// A post-build step shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub title: String,
    pub command: String,
}

/// Ordered post-build instructions; re-adding a title replaces its command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Instructions(Vec<Instruction>);

impl Instructions {
    pub fn add(&mut self, title: impl Into<String>, command: impl Into<String>) {
        let title = title.into();
        let command = command.into();
        match self.0.iter_mut().find(|i| i.title == title) {
            Some(existing) => existing.command = command,
            None => self.0.push(Instruction { title, command }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Instructions {
    /// Two blank lines, then each title and command followed by a blank line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f)?;
        for instruction in &self.0 {
            writeln!(f, "\t{}", instruction.title)?;
            writeln!(f, "\t{}", instruction.command)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything one build invocation reads and produces
///
/// Created fresh for every build and passed by `&mut` through population,
/// override merging, the handlers and the writer.
pub struct BuildContext {
    pub fs: Arc<dyn FileSystem>,
    pub paths: OutputPaths,
    /// Executable artifact the image is built around
    pub executable: PathBuf,
    /// Executable file name without its suffix
    pub base_name: Option<String>,
    pub overrides: Option<CloudToml>,
    pub deployment: Option<DeploymentModel>,
    pub job: Option<JobModel>,
    pub docker: Option<DockerModel>,
    pub services: Vec<ServiceModel>,
    pub artifacts: Vec<Artifact>,
    pub instructions: Instructions,
}

impl BuildContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        executable: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        overrides: Option<CloudToml>,
    ) -> Self {
        let executable = executable.into();
        let base_name = extract_artifact_name(&executable);
        Self {
            fs,
            paths: OutputPaths::new(output_dir),
            executable,
            base_name,
            overrides,
            deployment: None,
            job: None,
            docker: None,
            services: Vec::new(),
            artifacts: Vec::new(),
            instructions: Instructions::default(),
        }
    }

    pub fn base_name(&self) -> BuildResult<&str> {
        self.base_name.as_deref().ok_or_else(|| {
            BuildError::missing(
                "artifact name",
                format!("cannot derive a name from {}", self.executable.display()),
            )
        })
    }

    /// File name of the executable inside the image
    pub fn jar_file_name(&self) -> BuildResult<String> {
        Ok(format!("{}{}", self.base_name()?, EXECUTABLE_SUFFIX))
    }

    pub fn deployment_mut(&mut self) -> BuildResult<&mut DeploymentModel> {
        self.deployment
            .as_mut()
            .ok_or_else(|| BuildError::missing("deployment", "no deployment model in this build"))
    }

    /// The job when one exists, otherwise the deployment
    pub fn workload_mut(&mut self) -> BuildResult<&mut dyn Workload> {
        if let Some(job) = self.job.as_mut() {
            return Ok(job);
        }
        match self.deployment.as_mut() {
            Some(deployment) => Ok(deployment),
            None => Err(BuildError::missing(
                "workload",
                "neither a deployment nor a job model is present",
            )),
        }
    }

    pub fn queue(&mut self, kind: ArtifactKind, content: String) {
        self.artifacts.push(Artifact { kind, content });
    }

    pub fn output_root(&self) -> &Path {
        &self.paths.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn context(executable: &str) -> BuildContext {
        BuildContext::new(Arc::new(MockFileSystem::new()), executable, "/out", None)
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new("/work/target");
        assert_eq!(paths.kubernetes, PathBuf::from("/work/target/kubernetes"));
        assert_eq!(paths.docker, PathBuf::from("/work/target/docker"));
    }

    #[test]
    fn test_base_and_jar_name() {
        let ctx = context("/work/target/bin/hello.jar");
        assert_eq!(ctx.base_name().unwrap(), "hello");
        assert_eq!(ctx.jar_file_name().unwrap(), "hello.jar");
    }

    #[test]
    fn test_missing_base_name() {
        let ctx = context("/");
        assert!(matches!(
            ctx.base_name(),
            Err(BuildError::MissingField { .. })
        ));
    }

    #[test]
    fn test_workload_prefers_job() {
        let mut ctx = context("hello.jar");
        assert!(ctx.workload_mut().is_err());

        ctx.deployment = Some(DeploymentModel {
            name: "hello-deployment".to_string(),
            ..Default::default()
        });
        assert_eq!(ctx.workload_mut().unwrap().name(), "hello-deployment");

        ctx.job = Some(JobModel {
            name: "hello-job".to_string(),
            ..Default::default()
        });
        assert_eq!(ctx.workload_mut().unwrap().name(), "hello-job");
    }

    #[test]
    fn test_instructions_keep_order_and_replace_titles() {
        let mut instructions = Instructions::default();
        instructions.add("deploy", "kubectl apply -f /out");
        instructions.add("expose", "kubectl expose deployment a");
        instructions.add("deploy", "kubectl apply -f /other");

        let titles: Vec<&str> = instructions.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["deploy", "expose"]);
        assert_eq!(instructions.iter().next().unwrap().command, "kubectl apply -f /other");
    }

    #[test]
    fn test_instructions_display() {
        let mut instructions = Instructions::default();
        instructions.add("Run:", "docker run -d hello");
        assert_eq!(
            instructions.to_string(),
            "\n\n\tRun:\n\tdocker run -d hello\n\n"
        );
    }

    #[test]
    fn test_artifact_kind_suffixes() {
        assert_eq!(ArtifactKind::Service.suffix(), Some("_svc.yaml"));
        assert_eq!(ArtifactKind::Autoscaler.suffix(), Some("_hpa.yaml"));
        assert!(!ArtifactKind::Dockerfile.is_kubernetes());
    }
}
