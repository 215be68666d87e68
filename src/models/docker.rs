//! Container image model

use super::{Workload, DOCKER_LATEST_TAG};
use crate::error::{BuildError, BuildResult};
use crate::fs::FileSystem;
use crate::util::is_blank;
use std::collections::BTreeSet;
use std::path::Path;

/// A file copied into the image from `[[container.copy.files]]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CopyFileModel {
    pub source: String,
    pub target: String,
}

impl CopyFileModel {
    /// Validates one copy entry
    ///
    /// Both ends must be present, the source must exist locally and the
    /// target must be an absolute path inside the image.
    pub fn new(fs: &dyn FileSystem, source: Option<&str>, target: Option<&str>) -> BuildResult<Self> {
        let (Some(source), Some(target)) = (source, target) else {
            return Err(BuildError::InvalidOverride(
                "copy file entries require both sourceFile and target".to_string(),
            ));
        };
        if is_blank(Some(source)) || is_blank(Some(target)) {
            return Err(BuildError::InvalidOverride(
                "copy file entries require both sourceFile and target".to_string(),
            ));
        }
        if !fs.exists(Path::new(source)) {
            return Err(BuildError::InvalidOverride(format!(
                "copy file source does not exist: {}",
                source
            )));
        }
        if !Path::new(target).is_absolute() {
            return Err(BuildError::InvalidOverride(format!(
                "copy file target must be an absolute path: {}",
                target
            )));
        }
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerModel {
    pub name: String,
    pub tag: String,
    pub registry: Option<String>,
    pub base_image: String,
    pub ports: BTreeSet<u16>,
    pub copy_files: BTreeSet<CopyFileModel>,
    pub jar_file_name: String,
    pub cmd: Option<String>,
    pub command_args: Vec<String>,
    pub push: bool,
    pub build_image: bool,
    pub service: bool,
}

impl DockerModel {
    /// Derives the image description from a workload
    pub fn from_workload(workload: &dyn Workload, jar_file_name: impl Into<String>) -> Self {
        let (name, tag) = split_image(workload.image());
        Self {
            name,
            tag,
            registry: workload.registry().map(str::to_string),
            base_image: workload.base_image().to_string(),
            ports: workload.exposed_ports(),
            copy_files: BTreeSet::new(),
            jar_file_name: jar_file_name.into(),
            cmd: workload.cmd().map(str::to_string),
            command_args: workload.command_args().to_vec(),
            push: workload.push(),
            build_image: workload.build_image(),
            service: workload.is_service(),
        }
    }

    /// `registry/name:tag`, or `name:tag` without a registry
    pub fn image_reference(&self) -> String {
        match self.registry.as_deref() {
            Some(registry) if !is_blank(Some(registry)) => {
                format!("{}/{}:{}", registry, self.name, self.tag)
            }
            _ => format!("{}:{}", self.name, self.tag),
        }
    }

    /// Copy files with their path inside the Docker build directory
    ///
    /// An entry keeps its own file name unless another entry or the
    /// executable uses it too; those go under a numbered `copy-N/` directory.
    pub fn staged_copy_files(&self) -> Vec<(&CopyFileModel, String)> {
        let names: Vec<String> = self
            .copy_files
            .iter()
            .enumerate()
            .map(|(index, copy)| {
                Path::new(&copy.source)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| format!("copy-{}", index + 1))
            })
            .collect();

        self.copy_files
            .iter()
            .zip(&names)
            .enumerate()
            .map(|(index, (copy, name))| {
                let shared = *name == self.jar_file_name
                    || names.iter().filter(|other| *other == name).count() > 1;
                let staged = if shared {
                    format!("copy-{}/{}", index + 1, name)
                } else {
                    name.clone()
                };
                (copy, staged)
            })
            .collect()
    }
}

/// Splits `name:tag` at the last colon; the tag defaults to `latest`
///
/// A colon followed by a path segment belongs to a registry host and port,
/// not to a tag.
pub fn split_image(image: &str) -> (String, String) {
    match image.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name.to_string(), tag.to_string()),
        _ => (image.to_string(), DOCKER_LATEST_TAG.to_string()),
    }
}
