//! Turns an extracted intent into the target models

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use super::context::BuildContext;
use crate::extractors::{DeploymentIntent, ListenerInfo};
use crate::models::{
    DeploymentModel, JobModel, SecretVolumeModel, ServiceModel, DEFAULT_BASE_IMAGE,
    DEPLOYMENT_POSTFIX, DOCKER_LATEST_TAG, JOB_POSTFIX, SECURE_SOCKET_POSTFIX, SELECTOR_KEY,
    SVC_POSTFIX, SVC_PROTOCOL, SVC_TYPE_CLUSTER_IP,
};
use crate::output::dockerfile::APP_HOME;
use crate::overrides::merge::default_autoscaler;
use crate::util::valid_name;

/// Fills the context with a deployment (plus services) or a job
pub struct Populator {
    base_image: String,
}

impl Default for Populator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_IMAGE)
    }
}

impl Populator {
    pub fn new(base_image: impl Into<String>) -> Self {
        Self {
            base_image: base_image.into(),
        }
    }

    pub fn populate(&self, intent: &DeploymentIntent, context: &mut BuildContext) {
        let base = context.base_name.clone().unwrap_or_default();

        if let Some(task) = &intent.task {
            let job = self.job_model(&base, task.schedule());
            info!(job = %job.name, schedule = ?job.schedule, "Populated job model");
            context.job = Some(job);
            context.deployment = None;
            context.services.clear();
            return;
        }

        let listeners = resolve_listeners(intent);
        let mut deployment = self.deployment_model(&base);
        deployment.secret_volumes = secret_volumes(&listeners, &base);
        context.services = service_models(&listeners, &base);

        info!(
            deployment = %deployment.name,
            services = context.services.len(),
            secret_volumes = deployment.secret_volumes.len(),
            "Populated deployment model"
        );
        context.deployment = Some(deployment);
        context.job = None;
    }

    fn deployment_model(&self, base: &str) -> DeploymentModel {
        let mut deployment = DeploymentModel {
            base_image: self.base_image.clone(),
            ..Default::default()
        };
        if !base.is_empty() {
            deployment.name = format!("{}{}", valid_name(base), DEPLOYMENT_POSTFIX);
            deployment.image = format!("{}:{}", base, DOCKER_LATEST_TAG);
            deployment.add_label(SELECTOR_KEY, base);
            deployment.autoscaler = Some(default_autoscaler(&deployment.name));
        }
        deployment
    }

    fn job_model(&self, base: &str, schedule: String) -> JobModel {
        let mut job = JobModel {
            base_image: self.base_image.clone(),
            schedule: Some(schedule),
            ..Default::default()
        };
        if !base.is_empty() {
            job.name = format!("{}{}", valid_name(base), JOB_POSTFIX);
            job.image = format!("{}:{}", base, DOCKER_LATEST_TAG);
            job.labels.insert(SELECTOR_KEY.to_string(), base.to_string());
        }
        job
    }
}

/// Listeners with resolved ports, deduplicated on (name, port)
///
/// Declared listeners come first, then listeners only known through a service.
fn resolve_listeners(intent: &DeploymentIntent) -> Vec<ListenerInfo> {
    let mut seen = BTreeSet::new();
    let mut resolved = Vec::new();

    let candidates = intent
        .listeners
        .iter()
        .chain(intent.services.iter().map(|s| &s.listener));

    for listener in candidates {
        let mut listener = listener.clone();
        if listener.port == 0 {
            if let Some(value) = listener
                .port_ref
                .as_ref()
                .and_then(|r| intent.int_variables.get(r))
            {
                debug!(listener = %listener.name, port = value, "Resolved port reference");
                listener.port = *value;
            }
        }
        if listener.port == 0 {
            warn!(listener = %listener.name, "Skipping listener without a resolvable port");
            continue;
        }
        if seen.insert((listener.name.clone(), listener.port)) {
            resolved.push(listener);
        }
    }

    resolved
}

fn service_models(listeners: &[ListenerInfo], base: &str) -> Vec<ServiceModel> {
    let mut used = BTreeSet::new();
    let mut services = Vec::new();
    for (index, listener) in listeners.iter().enumerate() {
        let mut name = listener_name(listener, base);
        if !used.insert(name.clone()) {
            name = format!("{}-{}", name, listener.port);
            used.insert(name.clone());
        }
        services.push(ServiceModel {
            name: format!("{}{}", name, SVC_POSTFIX),
            labels: [(SELECTOR_KEY.to_string(), base.to_string())].into(),
            port: listener.port,
            target_port: listener.port,
            port_name: trim_separators(&valid_name(&format!("port-{}-{}", index + 1, name))),
            protocol: SVC_PROTOCOL.to_string(),
            selector: base.to_string(),
            service_type: SVC_TYPE_CLUSTER_IP.to_string(),
            tls: listener.config.is_some(),
        });
    }
    services
}

/// Kubernetes name for a listener
///
/// Listeners created inline on the root path have no usable name and take
/// the artifact name instead.
fn listener_name(listener: &ListenerInfo, base: &str) -> String {
    let name = trim_separators(&valid_name(&listener.name));
    if !name.is_empty() {
        return name;
    }
    let fallback = trim_separators(&valid_name(base));
    if fallback.is_empty() {
        "listener".to_string()
    } else {
        fallback
    }
}

fn trim_separators(name: &str) -> String {
    name.trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

/// One secret volume per directory holding TLS material
///
/// The first directory of a listener gets `<listener>-secure-socket`, further
/// ones a numeric suffix. Listeners sharing a directory share its volume.
fn secret_volumes(listeners: &[ListenerInfo], base: &str) -> Vec<SecretVolumeModel> {
    let mut volumes: Vec<SecretVolumeModel> = Vec::new();
    for listener in listeners {
        let Some(config) = &listener.config else {
            continue;
        };
        let prefix = format!("{}{}", listener_name(listener, base), SECURE_SOCKET_POSTFIX);
        let mut created = 0;

        for file in config.files() {
            let Some(mount_path) = container_path(file)
                .parent()
                .map(|p| p.to_string_lossy().to_string())
            else {
                continue;
            };
            if let Some(volume) = volumes.iter_mut().find(|v| v.mount_path == mount_path) {
                if !volume.files.iter().any(|f| f == file) {
                    volume.files.push(file.to_string());
                }
                continue;
            }

            created += 1;
            let name = if created == 1 {
                prefix.clone()
            } else {
                format!("{}-{}", prefix, created)
            };
            volumes.push(SecretVolumeModel {
                name,
                mount_path,
                files: vec![file.to_string()],
            });
        }
    }
    volumes
}

/// Location of `file` inside the container; relative paths start at the workdir
fn container_path(file: &str) -> PathBuf {
    let path = Path::new(file);
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        PathBuf::from(APP_HOME)
    };
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
