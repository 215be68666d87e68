//! Applies `Cloud.toml` values onto the target models
//!
//! Every merge replaces values rather than accumulating them, so applying the
//! same document twice leaves the models exactly as one application did.

use super::{AutoscalingSection, CloudToml, ImageSection, ProbeEntry};
use crate::error::{BuildError, BuildResult};
use crate::fs::FileSystem;
use crate::models::{
    CopyFileModel, DeploymentModel, DockerModel, EnvVarValue, JobModel, PersistentVolumeClaimModel,
    PodAutoscalerModel, ProbeModel, Workload, DEPLOYMENT_POSTFIX, HPA_POSTFIX, JOB_POSTFIX,
};
use crate::util::{is_blank, valid_name};
use std::collections::BTreeMap;
use tracing::debug;

const DEFAULT_MIN_REPLICAS: u32 = 1;
const DEFAULT_MAX_REPLICAS: u32 = 2;
const DEFAULT_CPU_PERCENTAGE: u32 = 50;
const DEFAULT_ACCESS_MODE: &str = "ReadWriteOnce";

/// Autoscaler a deployment gets when `Cloud.toml` does not disable it
pub fn default_autoscaler(deployment_name: &str) -> PodAutoscalerModel {
    PodAutoscalerModel {
        name: format!("{}{}", strip_workload_postfix(deployment_name), HPA_POSTFIX),
        min_replicas: DEFAULT_MIN_REPLICAS,
        max_replicas: DEFAULT_MAX_REPLICAS,
        cpu_percentage: DEFAULT_CPU_PERCENTAGE,
        memory_percentage: None,
    }
}

/// Applies deployment, env and settings keys to a deployment
pub fn merge_deployment(deployment: &mut DeploymentModel, toml: &CloudToml) -> BuildResult<()> {
    let section = &toml.cloud.deployment;

    let resources = &mut deployment.resources;
    override_value(&mut resources.min_memory, &section.min_memory);
    override_value(&mut resources.max_memory, &section.max_memory);
    override_value(&mut resources.min_cpu, &section.min_cpu);
    override_value(&mut resources.max_cpu, &section.max_cpu);

    if let Some(autoscaling) = &section.autoscaling {
        merge_autoscaler(deployment, autoscaling)?;
    }

    if let Some(readiness) = &section.probes.readiness {
        deployment.readiness_probe = Some(probe(readiness, "readiness")?);
    }
    if let Some(liveness) = &section.probes.liveness {
        deployment.liveness_probe = Some(probe(liveness, "liveness")?);
    }

    if !section.storage.volumes.is_empty() {
        deployment.volume_claims = section
            .storage
            .volumes
            .iter()
            .map(|volume| {
                let (Some(name), Some(local_path), Some(size)) =
                    (&volume.name, &volume.local_path, &volume.size)
                else {
                    return Err(BuildError::InvalidOverride(
                        "storage volumes require name, local_path and size".to_string(),
                    ));
                };
                Ok(PersistentVolumeClaimModel {
                    name: valid_name(name),
                    mount_path: local_path.clone(),
                    size: size.clone(),
                    access_mode: DEFAULT_ACCESS_MODE.to_string(),
                    read_only: false,
                })
            })
            .collect::<BuildResult<Vec<_>>>()?;
    }

    merge_env(&mut deployment.env, toml)?;
    merge_image_settings(
        &toml.container.image,
        &mut deployment.push,
        &mut deployment.cmd,
        &mut deployment.command_args,
    );
    if let Some(single_yaml) = toml.settings.single_yaml {
        deployment.single_yaml = single_yaml;
    }
    if let Some(build_image) = toml.settings.build_image {
        deployment.build_image = build_image;
    }

    debug!(deployment = %deployment.name, "Applied Cloud.toml to deployment");
    Ok(())
}

/// Applies env and settings keys to a job
pub fn merge_job(job: &mut JobModel, toml: &CloudToml) -> BuildResult<()> {
    merge_env(&mut job.env, toml)?;
    merge_image_settings(
        &toml.container.image,
        &mut job.push,
        &mut job.cmd,
        &mut job.command_args,
    );
    if let Some(single_yaml) = toml.settings.single_yaml {
        job.single_yaml = single_yaml;
    }
    if let Some(build_image) = toml.settings.build_image {
        job.build_image = build_image;
    }

    debug!(job = %job.name, "Applied Cloud.toml to job");
    Ok(())
}

/// Derives the Docker model for a workload and applies `container.*` keys
///
/// The resulting image reference is written back to the workload so the
/// manifests and the Dockerfile agree on it.
pub fn resolve_docker_model(
    workload: &mut dyn Workload,
    toml: Option<&CloudToml>,
    jar_file_name: &str,
    fs: &dyn FileSystem,
) -> BuildResult<DockerModel> {
    let mut docker = DockerModel::from_workload(&*workload, jar_file_name);

    if let Some(toml) = toml {
        let image = &toml.container.image;
        docker.name = non_blank(&image.name)
            .unwrap_or_else(|| strip_workload_postfix(workload.name()).to_string());
        if let Some(repository) = non_blank(&image.repository) {
            docker.registry = Some(repository);
        }
        if let Some(tag) = non_blank(&image.tag) {
            docker.tag = tag;
        }
        if let Some(base) = non_blank(&image.base) {
            docker.base_image = base;
        }

        for entry in &toml.container.copy.files {
            let copy = CopyFileModel::new(
                fs,
                entry.source_file.as_deref(),
                entry.target.as_deref(),
            )?;
            docker.copy_files.insert(copy);
        }
    }

    let reference = docker.image_reference();
    debug!(image = %reference, "Resolved container image");
    workload.set_image(reference);
    Ok(docker)
}

fn strip_workload_postfix(name: &str) -> &str {
    name.strip_suffix(DEPLOYMENT_POSTFIX)
        .or_else(|| name.strip_suffix(JOB_POSTFIX))
        .unwrap_or(name)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !is_blank(Some(*v)))
        .map(str::to_string)
}

fn override_value(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = non_blank(value) {
        *target = Some(value);
    }
}

fn merge_autoscaler(
    deployment: &mut DeploymentModel,
    autoscaling: &AutoscalingSection,
) -> BuildResult<()> {
    if autoscaling.enable == Some(false) {
        deployment.autoscaler = None;
        return Ok(());
    }

    let name = deployment.name.clone();
    let autoscaler = deployment
        .autoscaler
        .get_or_insert_with(|| default_autoscaler(&name));
    if let Some(min) = autoscaling.min_replicas {
        autoscaler.min_replicas = min;
    }
    if let Some(max) = autoscaling.max_replicas {
        autoscaler.max_replicas = max;
    }
    if let Some(cpu) = autoscaling.cpu {
        autoscaler.cpu_percentage = cpu;
    }
    if let Some(memory) = autoscaling.memory {
        autoscaler.memory_percentage = Some(memory);
    }

    if autoscaler.min_replicas > autoscaler.max_replicas {
        return Err(BuildError::InvalidOverride(format!(
            "autoscaling min_replicas ({}) exceeds max_replicas ({})",
            autoscaler.min_replicas, autoscaler.max_replicas
        )));
    }
    Ok(())
}

fn probe(entry: &ProbeEntry, kind: &str) -> BuildResult<ProbeModel> {
    let port = entry.port.ok_or_else(|| {
        BuildError::InvalidOverride(format!("{} probe requires a port", kind))
    })?;
    Ok(ProbeModel::new(port, non_blank(&entry.path)))
}

fn merge_env(env: &mut BTreeMap<String, EnvVarValue>, toml: &CloudToml) -> BuildResult<()> {
    for entry in &toml.cloud.config.envs {
        let (Some(name), Some(key), Some(config_name)) =
            (&entry.name, &entry.key_ref, &entry.config_name)
        else {
            return Err(BuildError::InvalidOverride(
                "config envs require key_ref, name and config_name".to_string(),
            ));
        };
        env.insert(
            name.clone(),
            EnvVarValue::ConfigMapKeyRef {
                name: config_name.clone(),
                key: key.clone(),
            },
        );
    }

    for entry in &toml.cloud.secret.envs {
        let (Some(name), Some(key), Some(secret_name)) =
            (&entry.name, &entry.key_ref, &entry.secret_name)
        else {
            return Err(BuildError::InvalidOverride(
                "secret envs require key_ref, name and secret_name".to_string(),
            ));
        };
        env.insert(
            name.clone(),
            EnvVarValue::SecretKeyRef {
                name: secret_name.clone(),
                key: key.clone(),
            },
        );
    }
    Ok(())
}

fn merge_image_settings(
    image: &ImageSection,
    push: &mut bool,
    cmd: &mut Option<String>,
    command_args: &mut Vec<String>,
) {
    if let Some(value) = image.push {
        *push = value;
    }
    override_value(cmd, &image.cmd);
    if let Some(args) = &image.args {
        *command_args = args.clone();
    }
}
