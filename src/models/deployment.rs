//! Deployment target model and the pieces hanging off it

use super::{EnvVarValue, Workload, DEFAULT_BASE_IMAGE, DEFAULT_PULL_POLICY};
use std::collections::{BTreeMap, BTreeSet};

/// Named container port registered by the service handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
    pub protocol: String,
}

/// CPU and memory requests and limits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequirements {
    pub min_memory: Option<String>,
    pub max_memory: Option<String>,
    pub min_cpu: Option<String>,
    pub max_cpu: Option<String>,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.min_memory.is_none()
            && self.max_memory.is_none()
            && self.min_cpu.is_none()
            && self.max_cpu.is_none()
    }
}

/// Readiness or liveness probe; HTTP GET when a path is set, TCP otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeModel {
    pub port: u16,
    pub path: Option<String>,
    pub initial_delay_seconds: u32,
    pub period_seconds: u32,
}

impl ProbeModel {
    pub fn new(port: u16, path: Option<String>) -> Self {
        Self {
            port,
            path,
            initial_delay_seconds: 30,
            period_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentVolumeClaimModel {
    pub name: String,
    pub mount_path: String,
    pub size: String,
    pub access_mode: String,
    pub read_only: bool,
}

/// Secret holding TLS material, mounted into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretVolumeModel {
    pub name: String,
    pub mount_path: String,
    /// Local files the secret is created from
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodAutoscalerModel {
    pub name: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_percentage: u32,
    pub memory_percentage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentModel {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub replicas: u32,
    pub image: String,
    pub image_pull_policy: String,
    pub ports: Vec<ContainerPort>,
    pub env: BTreeMap<String, EnvVarValue>,
    pub base_image: String,
    pub registry: Option<String>,
    pub push: bool,
    pub build_image: bool,
    pub cmd: Option<String>,
    pub command_args: Vec<String>,
    /// Write every Kubernetes artifact into one file
    pub single_yaml: bool,
    pub resources: ResourceRequirements,
    pub readiness_probe: Option<ProbeModel>,
    pub liveness_probe: Option<ProbeModel>,
    pub volume_claims: Vec<PersistentVolumeClaimModel>,
    pub secret_volumes: Vec<SecretVolumeModel>,
    pub autoscaler: Option<PodAutoscalerModel>,
}

impl Default for DeploymentModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            labels: BTreeMap::new(),
            replicas: 1,
            image: String::new(),
            image_pull_policy: DEFAULT_PULL_POLICY.to_string(),
            ports: Vec::new(),
            env: BTreeMap::new(),
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            registry: None,
            push: false,
            build_image: true,
            cmd: None,
            command_args: Vec::new(),
            single_yaml: false,
            resources: ResourceRequirements::default(),
            readiness_probe: None,
            liveness_probe: None,
            volume_claims: Vec::new(),
            secret_volumes: Vec::new(),
            autoscaler: None,
        }
    }
}

impl DeploymentModel {
    pub fn add_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.labels.insert(key.into(), value.into());
    }

    /// Adds a container port unless an identical one is already registered
    pub fn add_port(&mut self, port: ContainerPort) -> bool {
        if self.ports.contains(&port) {
            return false;
        }
        self.ports.push(port);
        true
    }
}

impl Workload for DeploymentModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn set_image(&mut self, image: String) {
        self.image = image;
    }

    fn base_image(&self) -> &str {
        &self.base_image
    }

    fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    fn cmd(&self) -> Option<&str> {
        self.cmd.as_deref()
    }

    fn command_args(&self) -> &[String] {
        &self.command_args
    }

    fn push(&self) -> bool {
        self.push
    }

    fn build_image(&self) -> bool {
        self.build_image
    }

    fn exposed_ports(&self) -> BTreeSet<u16> {
        self.ports.iter().map(|p| p.container_port).collect()
    }

    fn is_service(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, number: u16) -> ContainerPort {
        ContainerPort {
            name: name.to_string(),
            container_port: number,
            protocol: "TCP".to_string(),
        }
    }

    #[test]
    fn test_add_port_skips_duplicates() {
        let mut deployment = DeploymentModel::default();
        assert!(deployment.add_port(port("port-1-ep", 9090)));
        assert!(!deployment.add_port(port("port-1-ep", 9090)));
        assert!(deployment.add_port(port("port-2-ep", 9091)));
        assert_eq!(deployment.ports.len(), 2);
    }

    #[test]
    fn test_exposed_ports_are_ordered_and_unique() {
        let mut deployment = DeploymentModel::default();
        deployment.add_port(port("b", 9091));
        deployment.add_port(port("a", 8080));
        deployment.add_port(port("c", 9091));

        let ports: Vec<u16> = deployment.exposed_ports().into_iter().collect();
        assert_eq!(ports, vec![8080, 9091]);
    }

    #[test]
    fn test_defaults() {
        let deployment = DeploymentModel::default();
        assert_eq!(deployment.replicas, 1);
        assert_eq!(deployment.base_image, DEFAULT_BASE_IMAGE);
        assert!(deployment.build_image);
        assert!(deployment.resources.is_empty());
    }
}
