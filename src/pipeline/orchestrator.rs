use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use super::context::{BuildContext, Instructions};
use super::handlers::{
    register_service_ports, DeploymentHandler, DockerHandler, HpaHandler, JobHandler,
    PersistentVolumeClaimHandler, ServiceHandler,
};
use super::phase_trait::ArtifactHandler;
use super::populate::Populator;
use super::writer::write_artifacts;
use crate::error::{BuildError, BuildResult};
use crate::extractors::DeploymentIntent;
use crate::models::{Workload, DEPLOYMENT_POSTFIX, LOCAL_SVC_POSTFIX};
use crate::overrides::{merge_deployment, merge_job, resolve_docker_model};
use crate::progress::{ProgressEvent, ProgressHandler};

pub const DEPLOY_TITLE: &str = "Execute the below command to deploy the Kubernetes artifacts: ";
pub const EXPOSE_TITLE: &str = "Execute the below command to access service via NodePort: ";
pub const DOCKER_RUN_TITLE: &str = "Execute the below command to run the generated docker image: ";

/// Target platform of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudMode {
    #[default]
    #[serde(rename = "k8s")]
    Kubernetes,
    Docker,
}

impl FromStr for CloudMode {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "k8s" => Ok(CloudMode::Kubernetes),
            "docker" => Ok(CloudMode::Docker),
            other => Err(BuildError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for CloudMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudMode::Kubernetes => write!(f, "k8s"),
            CloudMode::Docker => write!(f, "docker"),
        }
    }
}

/// Runs one build: populate, merge overrides, handlers, write
pub struct BuildOrchestrator {
    mode: CloudMode,
    populator: Populator,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl BuildOrchestrator {
    pub fn new(mode: CloudMode) -> Self {
        Self {
            mode,
            populator: Populator::default(),
            progress_handler: None,
        }
    }

    pub fn with_base_image(mut self, base_image: impl Into<String>) -> Self {
        self.populator = Populator::new(base_image);
        self
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn mode(&self) -> CloudMode {
        self.mode
    }

    /// Generates every artifact for `intent` and returns the post-build
    /// instructions in the order they were added
    ///
    /// Files written before a failure are left in place.
    pub fn execute(
        &self,
        intent: &DeploymentIntent,
        context: &mut BuildContext,
    ) -> BuildResult<Instructions> {
        let start = Instant::now();
        info!(
            "Starting {} build for: {}",
            self.mode,
            context.executable.display()
        );
        self.notify(ProgressEvent::Started {
            artifact: context.executable.display().to_string(),
            mode: self.mode.to_string(),
        });

        let result = self.run(intent, context);
        match &result {
            Ok(instructions) => self.notify(ProgressEvent::Completed {
                instructions: instructions.len(),
                total_time: start.elapsed(),
            }),
            Err(err) => self.notify(ProgressEvent::Failed {
                error: err.to_string(),
            }),
        }
        result
    }

    fn run(&self, intent: &DeploymentIntent, context: &mut BuildContext) -> BuildResult<Instructions> {
        self.populator.populate(intent, context);
        apply_overrides(context)?;
        self.notify(ProgressEvent::ModelsReady {
            services: context.services.len(),
            job: context.job.is_some(),
        });

        match self.mode {
            CloudMode::Kubernetes => self.run_kubernetes(context)?,
            CloudMode::Docker => self.run_docker(context)?,
        }

        let count = context.artifacts.len();
        let instructions = write_artifacts(context)?;
        self.notify(ProgressEvent::ArtifactsWritten { count });
        Ok(instructions)
    }

    fn run_kubernetes(&self, context: &mut BuildContext) -> BuildResult<()> {
        add_kubernetes_instructions(context);

        let handlers: Vec<Box<dyn ArtifactHandler>> = if context.job.is_some() {
            vec![Box::new(JobHandler), Box::new(DockerHandler)]
        } else {
            vec![
                Box::new(ServiceHandler),
                Box::new(PersistentVolumeClaimHandler),
                Box::new(DeploymentHandler),
                Box::new(HpaHandler),
                Box::new(DockerHandler),
            ]
        };

        for handler in handlers {
            self.run_handler(handler.as_ref(), context)?;
        }
        Ok(())
    }

    fn run_docker(&self, context: &mut BuildContext) -> BuildResult<()> {
        if context.deployment.is_some() {
            register_service_ports(context)?;
        }

        let jar_file_name = context.jar_file_name()?;
        let fs = Arc::clone(&context.fs);
        let workload: &mut dyn Workload = if let Some(job) = context.job.as_mut() {
            job
        } else if let Some(deployment) = context.deployment.as_mut() {
            deployment
        } else {
            return Err(BuildError::missing(
                "workload",
                "neither a deployment nor a job model is present",
            ));
        };
        let docker = resolve_docker_model(
            workload,
            context.overrides.as_ref(),
            &jar_file_name,
            fs.as_ref(),
        )?;

        let ports: String = docker
            .ports
            .iter()
            .map(|port| format!(" -p {}:{}", port, port))
            .collect();
        let command = format!("docker run -d{} {}", ports, docker.name);
        context.docker = Some(docker);

        self.run_handler(&DockerHandler, context)?;
        context.instructions.add(DOCKER_RUN_TITLE, command);
        Ok(())
    }

    fn run_handler(&self, handler: &dyn ArtifactHandler, context: &mut BuildContext) -> BuildResult<()> {
        let name = handler.name();
        self.notify(ProgressEvent::HandlerStarted {
            handler: name.to_string(),
        });

        let handler_start = Instant::now();
        handler.create_artifacts(context)?;

        self.notify(ProgressEvent::HandlerComplete {
            handler: name.to_string(),
            duration: handler_start.elapsed(),
        });
        debug!("Handler {} complete", name);
        Ok(())
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}

/// Applies `Cloud.toml` to whichever workload the build holds
fn apply_overrides(context: &mut BuildContext) -> BuildResult<()> {
    let Some(toml) = context.overrides.as_ref() else {
        return Ok(());
    };
    if let Some(job) = context.job.as_mut() {
        merge_job(job, toml)?;
    } else if let Some(deployment) = context.deployment.as_mut() {
        merge_deployment(deployment, toml)?;
    }
    debug!("Applied Cloud.toml overrides");
    Ok(())
}

fn add_kubernetes_instructions(context: &mut BuildContext) {
    if let Some(deployment) = &context.deployment {
        for volume in &deployment.secret_volumes {
            let files: String = volume
                .files
                .iter()
                .map(|file| format!(" --from-file={}", file))
                .collect();
            context.instructions.add(
                format!("Execute the below command to create the secret {}: ", volume.name),
                format!("kubectl create secret generic {}{}", volume.name, files),
            );
        }
    }

    context.instructions.add(
        DEPLOY_TITLE,
        format!(
            "kubectl apply -f {}",
            absolute(&context.paths.kubernetes).display()
        ),
    );

    if context.job.is_none() {
        if let Some(deployment) = &context.deployment {
            let service_name = deployment
                .name
                .replace(DEPLOYMENT_POSTFIX, LOCAL_SVC_POSTFIX);
            context.instructions.add(
                EXPOSE_TITLE,
                format!(
                    "kubectl expose deployment {} --type=NodePort --name={}",
                    deployment.name, service_name
                ),
            );
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{ListenerInfo, ServiceInfo, Task};
    use crate::fs::{FileSystem, MockFileSystem};
    use crate::overrides::CloudToml;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use yare::parameterized;

    fn hello_intent() -> DeploymentIntent {
        let listener = ListenerInfo::new("helloEp", 9090);
        DeploymentIntent {
            listeners: vec![listener.clone()],
            services: vec![ServiceInfo {
                listener,
                path: "hello".to_string(),
                resources: Vec::new(),
            }],
            ..Default::default()
        }
    }

    fn context(fs: Arc<MockFileSystem>, overrides: Option<CloudToml>) -> BuildContext {
        BuildContext::new(fs, "/work/target/bin/hello.jar", "/work/target", overrides)
    }

    #[parameterized(
        kubernetes = { "k8s", CloudMode::Kubernetes },
        docker = { "docker", CloudMode::Docker },
        padded = { " k8s ", CloudMode::Kubernetes },
    )]
    fn test_mode_from_str(value: &str, expected: CloudMode) {
        assert_eq!(value.parse::<CloudMode>().unwrap(), expected);
    }

    #[test]
    fn test_unsupported_mode() {
        let err = "helm".parse::<CloudMode>().unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedMode(ref mode) if mode == "helm"));
    }

    #[test]
    fn test_kubernetes_build() {
        let fs = Arc::new(MockFileSystem::new());
        let mut ctx = context(fs.clone(), None);

        let instructions = BuildOrchestrator::new(CloudMode::Kubernetes)
            .execute(&hello_intent(), &mut ctx)
            .unwrap();

        for file in [
            "/work/target/kubernetes/hello_svc.yaml",
            "/work/target/kubernetes/hello_deployment.yaml",
            "/work/target/kubernetes/hello_hpa.yaml",
            "/work/target/docker/Dockerfile",
        ] {
            assert!(fs.is_file(Path::new(file)), "missing {}", file);
        }
        assert!(!fs.exists(Path::new("/work/target/kubernetes/hello_volume_claim.yaml")));

        let dockerfile = fs
            .read_to_string(Path::new("/work/target/docker/Dockerfile"))
            .unwrap();
        assert!(dockerfile.contains("EXPOSE 9090"));

        let commands: Vec<&str> = instructions.iter().map(|i| i.command.as_str()).collect();
        assert_eq!(
            commands,
            vec![
                "kubectl apply -f /work/target/kubernetes",
                "kubectl expose deployment hello-deployment --type=NodePort --name=hello-svc-local",
            ]
        );
    }

    #[test]
    fn test_job_build_has_no_service_artifacts() {
        let fs = Arc::new(MockFileSystem::new());
        let mut ctx = context(fs.clone(), None);
        let mut intent = hello_intent();
        intent.task = Some(Task {
            minutes: Some("0".to_string()),
            hours: Some("2".to_string()),
            ..Default::default()
        });

        let instructions = BuildOrchestrator::new(CloudMode::Kubernetes)
            .execute(&intent, &mut ctx)
            .unwrap();

        assert!(fs.is_file(Path::new("/work/target/kubernetes/hello_job.yaml")));
        assert!(!fs.exists(Path::new("/work/target/kubernetes/hello_deployment.yaml")));
        assert!(!fs.exists(Path::new("/work/target/kubernetes/hello_svc.yaml")));
        assert!(instructions.iter().all(|i| i.title != EXPOSE_TITLE));
    }

    #[test]
    fn test_docker_only_build() {
        let fs = Arc::new(MockFileSystem::new());
        let mut ctx = context(fs.clone(), None);

        let instructions = BuildOrchestrator::new(CloudMode::Docker)
            .execute(&hello_intent(), &mut ctx)
            .unwrap();

        assert!(fs.is_file(Path::new("/work/target/docker/Dockerfile")));
        assert!(!fs.exists(Path::new("/work/target/kubernetes")));

        let run: Vec<_> = instructions.iter().collect();
        assert_eq!(run.len(), 1);
        assert_eq!(run[0].title, DOCKER_RUN_TITLE);
        assert_eq!(run[0].command, "docker run -d -p 9090:9090 hello");
    }

    #[test]
    fn test_overrides_flow_into_artifacts() {
        let fs = Arc::new(MockFileSystem::new());
        let overrides = CloudToml::parse(
            r#"
[container.image]
repository = "wso2inc"
tag = "v1.0.0"

[cloud.deployment.autoscaling]
enable = false
"#,
        )
        .unwrap();
        let mut ctx = context(fs.clone(), Some(overrides));

        BuildOrchestrator::new(CloudMode::Kubernetes)
            .execute(&hello_intent(), &mut ctx)
            .unwrap();

        let deployment = fs
            .read_to_string(Path::new("/work/target/kubernetes/hello_deployment.yaml"))
            .unwrap();
        assert!(deployment.contains("image: wso2inc/hello:v1.0.0"));
        assert!(!fs.exists(Path::new("/work/target/kubernetes/hello_hpa.yaml")));
    }

    #[test]
    fn test_secret_instruction_precedes_deploy() {
        use crate::extractors::{SecureSocketConfig, TlsConfig};

        let fs = Arc::new(MockFileSystem::new());
        let mut ctx = context(fs, None);
        let config = TlsConfig {
            secure_socket: Some(SecureSocketConfig {
                cert_file: Some("/certs/public.crt".to_string()),
                key_file: Some("/certs/private.key".to_string()),
                path: None,
            }),
            mutual_ssl: None,
        };
        let intent = DeploymentIntent {
            listeners: vec![ListenerInfo::new("secureEp", 9095).with_config(Some(config))],
            ..Default::default()
        };

        let instructions = BuildOrchestrator::new(CloudMode::Kubernetes)
            .execute(&intent, &mut ctx)
            .unwrap();

        let first = instructions.iter().next().unwrap();
        assert_eq!(
            first.command,
            "kubectl create secret generic secureep-secure-socket --from-file=/certs/public.crt --from-file=/certs/private.key"
        );
    }

    #[test]
    fn test_progress_events_are_reported() {
        struct Counter(AtomicUsize);
        impl ProgressHandler for Counter {
            fn on_progress(&self, _event: &ProgressEvent) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let mut ctx = context(Arc::new(MockFileSystem::new()), None);
        BuildOrchestrator::new(CloudMode::Docker)
            .with_progress(counter.clone())
            .execute(&hello_intent(), &mut ctx)
            .unwrap();

        // started, models, docker start/complete, written, completed
        assert_eq!(counter.0.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_failure_is_reported_and_aborts() {
        let fs = Arc::new(MockFileSystem::new());
        let mut ctx = BuildContext::new(fs.clone(), "/", "/work/target", None);

        let result = BuildOrchestrator::new(CloudMode::Kubernetes).execute(&hello_intent(), &mut ctx);
        assert!(matches!(result, Err(BuildError::MissingField { .. })));
        assert!(fs.file_paths().is_empty());
    }
}
