//! `Cloud.toml` override document
//!
//! Every key is optional. Values present in the document win over the
//! defaults derived from source; absent keys leave the models untouched.
//!
//! ```toml
//! [container.image]
//! name = "myorg/app"
//! tag = "v2"
//!
//! [[container.copy.files]]
//! sourceFile = "./conf/Config.toml"
//! target = "/home/app/conf/Config.toml"
//!
//! [cloud.deployment.autoscaling]
//! min_replicas = 2
//! max_replicas = 5
//! ```

pub mod merge;

pub use merge::{merge_deployment, merge_job, resolve_docker_model};

use crate::error::{BuildError, BuildResult};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional file name of the override document
pub const CLOUD_TOML: &str = "Cloud.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudToml {
    #[serde(default)]
    pub container: ContainerSection,
    #[serde(default)]
    pub cloud: CloudSection,
    #[serde(default)]
    pub settings: SettingsSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSection {
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub copy: CopySection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSection {
    pub name: Option<String>,
    pub repository: Option<String>,
    pub tag: Option<String>,
    pub base: Option<String>,
    pub push: Option<bool>,
    /// Replaces the default `java -jar` command
    pub cmd: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopySection {
    #[serde(default)]
    pub files: Vec<CopyFileEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyFileEntry {
    #[serde(rename = "sourceFile")]
    pub source_file: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudSection {
    #[serde(default)]
    pub deployment: DeploymentSection,
    #[serde(default)]
    pub config: EnvSection<ConfigEnvEntry>,
    #[serde(default)]
    pub secret: EnvSection<SecretEnvEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSection {
    pub min_memory: Option<String>,
    pub max_memory: Option<String>,
    pub min_cpu: Option<String>,
    pub max_cpu: Option<String>,
    pub autoscaling: Option<AutoscalingSection>,
    #[serde(default)]
    pub probes: ProbesSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingSection {
    pub enable: Option<bool>,
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
    /// Target average CPU utilization, in percent
    pub cpu: Option<u32>,
    /// Target average memory utilization, in percent
    pub memory: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbesSection {
    pub readiness: Option<ProbeEntry>,
    pub liveness: Option<ProbeEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeEntry {
    pub port: Option<u16>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub volumes: Vec<VolumeEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeEntry {
    pub name: Option<String>,
    pub local_path: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSection<T> {
    #[serde(default = "Vec::new")]
    pub envs: Vec<T>,
}

impl<T> Default for EnvSection<T> {
    fn default() -> Self {
        Self { envs: Vec::new() }
    }
}

/// Env var read from a config map key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigEnvEntry {
    pub key_ref: Option<String>,
    pub name: Option<String>,
    pub config_name: Option<String>,
}

/// Env var read from a secret key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretEnvEntry {
    pub key_ref: Option<String>,
    pub name: Option<String>,
    pub secret_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSection {
    #[serde(rename = "singleYAML")]
    pub single_yaml: Option<bool>,
    #[serde(rename = "buildImage")]
    pub build_image: Option<bool>,
}

impl CloudToml {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> BuildResult<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| BuildError::io(path, e))?;
        Self::parse(&content).map_err(|source| BuildError::OverrideParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_parse_full_document() {
        let toml = CloudToml::parse(
            r#"
[container.image]
name = "hello"
repository = "docker.io/anuruddhal"
tag = "v1.0.0"
base = "eclipse-temurin:21-jre"

[[container.copy.files]]
sourceFile = "./data/data.txt"
target = "/home/ballerina/data/data.txt"

[cloud.deployment]
min_memory = "100Mi"
max_memory = "256Mi"
min_cpu = "500m"
max_cpu = "500m"

[cloud.deployment.autoscaling]
min_replicas = 2
max_replicas = 3
cpu = 60

[cloud.deployment.probes.liveness]
port = 9091
path = "/probe/live"

[[cloud.deployment.storage.volumes]]
name = "volume1"
local_path = "/home/ballerina/data"
size = "2Gi"

[[cloud.config.envs]]
key_ref = "DB_HOST"
name = "DB_HOST"
config_name = "db-config"

[[cloud.secret.envs]]
key_ref = "password"
name = "DB_PASSWORD"
secret_name = "db-credentials"

[settings]
singleYAML = true
"#,
        )
        .unwrap();

        assert_eq!(toml.container.image.tag.as_deref(), Some("v1.0.0"));
        assert_eq!(
            toml.container.copy.files[0].source_file.as_deref(),
            Some("./data/data.txt")
        );
        assert_eq!(toml.cloud.deployment.max_memory.as_deref(), Some("256Mi"));
        assert_eq!(
            toml.cloud.deployment.autoscaling.as_ref().unwrap().cpu,
            Some(60)
        );
        assert_eq!(
            toml.cloud.deployment.probes.liveness.as_ref().unwrap().port,
            Some(9091)
        );
        assert!(toml.cloud.deployment.probes.readiness.is_none());
        assert_eq!(toml.cloud.deployment.storage.volumes.len(), 1);
        assert_eq!(
            toml.cloud.config.envs[0].config_name.as_deref(),
            Some("db-config")
        );
        assert_eq!(
            toml.cloud.secret.envs[0].secret_name.as_deref(),
            Some("db-credentials")
        );
        assert_eq!(toml.settings.single_yaml, Some(true));
        assert_eq!(toml.settings.build_image, None);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(CloudToml::parse("").unwrap(), CloudToml::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let toml = CloudToml::parse(
            r#"
[container.image]
user.run_as = "ballerina"

[graalvm.builder]
base = "ghcr.io/graalvm/native-image"
"#,
        )
        .unwrap();
        assert_eq!(toml.container.image.name, None);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/Cloud.toml", "[container.image\nname = ");

        let err = CloudToml::load(&fs, Path::new("/project/Cloud.toml")).unwrap_err();
        assert!(matches!(err, BuildError::OverrideParse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let fs = MockFileSystem::new();
        let err = CloudToml::load(&fs, Path::new("/project/Cloud.toml")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
