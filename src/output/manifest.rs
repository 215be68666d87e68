//! Kubernetes resource documents
//!
//! Only the subset of each resource kind that the generator emits is
//! modelled. Field names follow the Kubernetes API (camelCase) and empty
//! collections are left out of the rendered YAML.

use super::dockerfile::APP_HOME;
use crate::error::BuildResult;
use crate::models::{
    ContainerPort, DeploymentModel, EnvVarValue, JobModel, PersistentVolumeClaimModel,
    PodAutoscalerModel, ProbeModel, ResourceRequirements, SecretVolumeModel, ServiceModel,
    SELECTOR_KEY,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Renders one YAML document prefixed with a `---` separator
pub fn to_yaml_document<T: Serialize>(resource: &T) -> BuildResult<String> {
    Ok(format!("---\n{}", serde_yaml::to_string(resource)?))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    fn new(name: &str, labels: &BTreeMap<String, String>) -> Self {
        Self {
            name: name.to_string(),
            labels: labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    pub ports: Vec<ServicePort>,
    pub selector: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub service_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub protocol: String,
    pub target_port: u16,
}

impl From<&ServiceModel> for Service {
    fn from(model: &ServiceModel) -> Self {
        let mut selector = BTreeMap::new();
        selector.insert(SELECTOR_KEY.to_string(), model.selector.clone());

        Self {
            api_version: "v1",
            kind: "Service",
            metadata: ObjectMeta::new(&model.name, &model.labels),
            spec: ServiceSpec {
                ports: vec![ServicePort {
                    name: model.port_name.clone(),
                    port: model.port,
                    protocol: model.protocol.clone(),
                    target_port: model.target_port,
                }],
                selector,
                service_type: model.service_type.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub replicas: u32,
    pub selector: LabelSelector,
    pub template: PodTemplateSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    pub metadata: TemplateMeta,
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image: String,
    pub image_pull_policy: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPortSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPortSpec {
    pub name: String,
    pub container_port: u16,
    pub protocol: String,
}

impl From<&ContainerPort> for ContainerPortSpec {
    fn from(port: &ContainerPort) -> Self {
        Self {
            name: port.name.clone(),
            container_port: port.container_port,
            protocol: port.protocol.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<ObjectFieldSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeySelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_field_ref: Option<ResourceFieldSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeySelector>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldSelector {
    pub field_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySelector {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFieldSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    pub resource: String,
}

/// Converts the env map into container env vars, ordered by name
pub fn env_vars(env: &BTreeMap<String, EnvVarValue>) -> Vec<EnvVar> {
    env.iter()
        .map(|(name, value)| {
            let (value, value_from) = match value {
                EnvVarValue::Value(v) => (Some(v.clone()), None),
                EnvVarValue::FieldRef { field_path } => (
                    None,
                    Some(EnvVarSource {
                        field_ref: Some(ObjectFieldSelector {
                            field_path: field_path.clone(),
                        }),
                        ..Default::default()
                    }),
                ),
                EnvVarValue::SecretKeyRef { name, key } => (
                    None,
                    Some(EnvVarSource {
                        secret_key_ref: Some(KeySelector {
                            name: name.clone(),
                            key: key.clone(),
                        }),
                        ..Default::default()
                    }),
                ),
                EnvVarValue::ResourceFieldRef {
                    container_name,
                    resource,
                } => (
                    None,
                    Some(EnvVarSource {
                        resource_field_ref: Some(ResourceFieldSelector {
                            container_name: container_name.clone(),
                            resource: resource.clone(),
                        }),
                        ..Default::default()
                    }),
                ),
                EnvVarValue::ConfigMapKeyRef { name, key } => (
                    None,
                    Some(EnvVarSource {
                        config_map_key_ref: Some(KeySelector {
                            name: name.clone(),
                            key: key.clone(),
                        }),
                        ..Default::default()
                    }),
                ),
            };
            EnvVar {
                name: name.clone(),
                value,
                value_from,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

impl Resources {
    fn from_model(model: &ResourceRequirements) -> Option<Self> {
        if model.is_empty() {
            return None;
        }
        let mut requests = BTreeMap::new();
        let mut limits = BTreeMap::new();
        if let Some(cpu) = &model.min_cpu {
            requests.insert("cpu".to_string(), cpu.clone());
        }
        if let Some(memory) = &model.min_memory {
            requests.insert("memory".to_string(), memory.clone());
        }
        if let Some(cpu) = &model.max_cpu {
            limits.insert("cpu".to_string(), cpu.clone());
        }
        if let Some(memory) = &model.max_memory {
            limits.insert("memory".to_string(), memory.clone());
        }
        Some(Self { requests, limits })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TcpSocketAction>,
    pub initial_delay_seconds: u32,
    pub period_seconds: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    pub path: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpSocketAction {
    pub port: u16,
}

impl From<&ProbeModel> for Probe {
    fn from(model: &ProbeModel) -> Self {
        let (http_get, tcp_socket) = match &model.path {
            Some(path) => (
                Some(HttpGetAction {
                    path: path.clone(),
                    port: model.port,
                }),
                None,
            ),
            None => (None, Some(TcpSocketAction { port: model.port })),
        };
        Self {
            http_get,
            tcp_socket,
            initial_delay_seconds: model.initial_delay_seconds,
            period_seconds: model.period_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<ClaimSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretSource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSource {
    pub claim_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSource {
    pub secret_name: String,
}

/// Mounts for one secret volume
///
/// A secret whose files sit directly in the workdir would hide the
/// executable, so each file is mounted on its own there.
fn secret_mounts(secret: &SecretVolumeModel) -> Vec<VolumeMount> {
    let name = format!("{}-volume", secret.name);
    let workdir = Path::new(APP_HOME);
    if Path::new(&secret.mount_path) != workdir {
        return vec![VolumeMount {
            name,
            mount_path: secret.mount_path.clone(),
            sub_path: None,
            read_only: true,
        }];
    }

    secret
        .files
        .iter()
        .filter_map(|file| Path::new(file).file_name())
        .map(|file_name| VolumeMount {
            name: name.clone(),
            mount_path: workdir.join(file_name).to_string_lossy().to_string(),
            sub_path: Some(file_name.to_string_lossy().to_string()),
            read_only: true,
        })
        .collect()
}

impl From<&DeploymentModel> for Deployment {
    fn from(model: &DeploymentModel) -> Self {
        let mut match_labels = BTreeMap::new();
        if let Some(app) = model.labels.get(SELECTOR_KEY) {
            match_labels.insert(SELECTOR_KEY.to_string(), app.clone());
        }

        let mut volumes = Vec::new();
        let mut volume_mounts = Vec::new();
        for claim in &model.volume_claims {
            volume_mounts.push(VolumeMount {
                name: format!("{}-volume", claim.name),
                mount_path: claim.mount_path.clone(),
                sub_path: None,
                read_only: claim.read_only,
            });
            volumes.push(Volume {
                name: format!("{}-volume", claim.name),
                persistent_volume_claim: Some(ClaimSource {
                    claim_name: claim.name.clone(),
                }),
                secret: None,
            });
        }
        for secret in &model.secret_volumes {
            volume_mounts.extend(secret_mounts(secret));
            volumes.push(Volume {
                name: format!("{}-volume", secret.name),
                persistent_volume_claim: None,
                secret: Some(SecretSource {
                    secret_name: secret.name.clone(),
                }),
            });
        }

        let container = Container {
            name: model.name.clone(),
            image: model.image.clone(),
            image_pull_policy: model.image_pull_policy.clone(),
            ports: model.ports.iter().map(ContainerPortSpec::from).collect(),
            env: env_vars(&model.env),
            resources: Resources::from_model(&model.resources),
            readiness_probe: model.readiness_probe.as_ref().map(Probe::from),
            liveness_probe: model.liveness_probe.as_ref().map(Probe::from),
            volume_mounts,
        };

        Self {
            api_version: "apps/v1",
            kind: "Deployment",
            metadata: ObjectMeta::new(&model.name, &model.labels),
            spec: DeploymentSpec {
                replicas: model.replicas,
                selector: LabelSelector { match_labels },
                template: PodTemplateSpec {
                    metadata: TemplateMeta {
                        labels: model.labels.clone(),
                    },
                    spec: PodSpec {
                        containers: vec![container],
                        volumes,
                        restart_policy: None,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaim {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: ClaimSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSpec {
    pub access_modes: Vec<String>,
    pub resources: ClaimResources,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResources {
    pub requests: BTreeMap<String, String>,
}

impl From<&PersistentVolumeClaimModel> for PersistentVolumeClaim {
    fn from(model: &PersistentVolumeClaimModel) -> Self {
        let mut requests = BTreeMap::new();
        requests.insert("storage".to_string(), model.size.clone());
        Self {
            api_version: "v1",
            kind: "PersistentVolumeClaim",
            metadata: ObjectMeta::new(&model.name, &BTreeMap::new()),
            spec: ClaimSpec {
                access_modes: vec![model.access_mode.clone()],
                resources: ClaimResources { requests },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscaler {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: AutoscalerSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalerSpec {
    pub scale_target_ref: ScaleTargetRef,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub metrics: Vec<MetricSpec>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTargetRef {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    #[serde(rename = "type")]
    pub metric_type: &'static str,
    pub resource: ResourceMetric,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetric {
    pub name: &'static str,
    pub target: MetricTarget,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    #[serde(rename = "type")]
    pub target_type: &'static str,
    pub average_utilization: u32,
}

impl HorizontalPodAutoscaler {
    pub fn new(model: &PodAutoscalerModel, deployment: &DeploymentModel) -> Self {
        let utilization = |name: &'static str, percentage: u32| MetricSpec {
            metric_type: "Resource",
            resource: ResourceMetric {
                name,
                target: MetricTarget {
                    target_type: "Utilization",
                    average_utilization: percentage,
                },
            },
        };

        let mut metrics = vec![utilization("cpu", model.cpu_percentage)];
        if let Some(memory) = model.memory_percentage {
            metrics.push(utilization("memory", memory));
        }

        Self {
            api_version: "autoscaling/v2",
            kind: "HorizontalPodAutoscaler",
            metadata: ObjectMeta::new(&model.name, &deployment.labels),
            spec: AutoscalerSpec {
                scale_target_ref: ScaleTargetRef {
                    api_version: "apps/v1",
                    kind: "Deployment",
                    name: deployment.name.clone(),
                },
                min_replicas: model.min_replicas,
                max_replicas: model.max_replicas,
                metrics,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: JobSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub backoff_limit: u32,
    pub template: PodTemplateSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: CronJobSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobSpec {
    pub schedule: String,
    pub job_template: JobTemplateSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateSpec {
    pub spec: JobSpec,
}

fn job_spec(model: &JobModel) -> JobSpec {
    JobSpec {
        backoff_limit: model.backoff_limit,
        template: PodTemplateSpec {
            metadata: TemplateMeta {
                labels: model.labels.clone(),
            },
            spec: PodSpec {
                containers: vec![Container {
                    name: model.name.clone(),
                    image: model.image.clone(),
                    image_pull_policy: model.image_pull_policy.clone(),
                    ports: Vec::new(),
                    env: env_vars(&model.env),
                    resources: None,
                    readiness_probe: None,
                    liveness_probe: None,
                    volume_mounts: Vec::new(),
                }],
                volumes: Vec::new(),
                restart_policy: Some(model.restart_policy.clone()),
            },
        },
    }
}

impl From<&JobModel> for Job {
    fn from(model: &JobModel) -> Self {
        Self {
            api_version: "batch/v1",
            kind: "Job",
            metadata: ObjectMeta::new(&model.name, &model.labels),
            spec: job_spec(model),
        }
    }
}

impl CronJob {
    pub fn new(model: &JobModel, schedule: &str) -> Self {
        Self {
            api_version: "batch/v1",
            kind: "CronJob",
            metadata: ObjectMeta::new(&model.name, &model.labels),
            spec: CronJobSpec {
                schedule: schedule.to_string(),
                job_template: JobTemplateSpec {
                    spec: job_spec(model),
                },
            },
        }
    }
}
