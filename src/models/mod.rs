//! Target models filled in by the populator and the override merger
//!
//! These are the canonical descriptions the artifact handlers render. A build
//! holds either a [`DeploymentModel`] or a [`JobModel`], never both.

pub mod deployment;
pub mod docker;
pub mod env;
pub mod job;
pub mod service;

pub use deployment::{
    ContainerPort, DeploymentModel, PersistentVolumeClaimModel, PodAutoscalerModel, ProbeModel,
    ResourceRequirements, SecretVolumeModel,
};
pub use docker::{CopyFileModel, DockerModel};
pub use env::EnvVarValue;
pub use job::JobModel;
pub use service::ServiceModel;

use std::collections::BTreeSet;

pub const DEPLOYMENT_POSTFIX: &str = "-deployment";
pub const JOB_POSTFIX: &str = "-job";
pub const SVC_POSTFIX: &str = "-svc";
pub const HPA_POSTFIX: &str = "-hpa";
pub const PVC_POSTFIX: &str = "-pvc";
pub const SECURE_SOCKET_POSTFIX: &str = "-secure-socket";
pub const LOCAL_SVC_POSTFIX: &str = "-svc-local";

pub const SELECTOR_KEY: &str = "app";
pub const SVC_PROTOCOL: &str = "TCP";
pub const SVC_TYPE_CLUSTER_IP: &str = "ClusterIP";
pub const DOCKER_LATEST_TAG: &str = "latest";
pub const DEFAULT_BASE_IMAGE: &str = "eclipse-temurin:17-jre";
pub const DEFAULT_PULL_POLICY: &str = "IfNotPresent";

/// Image-related view shared by deployments and jobs
///
/// The Docker model is resolved from whichever workload the build produces,
/// and the final image reference is written back through this trait.
pub trait Workload {
    fn name(&self) -> &str;
    fn image(&self) -> &str;
    fn set_image(&mut self, image: String);
    fn base_image(&self) -> &str;
    fn registry(&self) -> Option<&str>;
    fn cmd(&self) -> Option<&str>;
    fn command_args(&self) -> &[String];
    fn push(&self) -> bool;
    fn build_image(&self) -> bool;
    /// Container ports the image must expose
    fn exposed_ports(&self) -> BTreeSet<u16>;
    /// Whether the workload is a long-running service
    fn is_service(&self) -> bool;
}
