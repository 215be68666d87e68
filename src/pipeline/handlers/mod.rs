// Artifact handlers, one per generated resource
//
// Service mode runs service, volume claim, deployment, autoscaler and docker
// in that order; job mode runs job then docker.

#[path = "01_job.rs"]
pub mod job;
#[path = "01_service.rs"]
pub mod service;
#[path = "02_volume_claim.rs"]
pub mod volume_claim;
#[path = "03_deployment.rs"]
pub mod deployment;
#[path = "04_hpa.rs"]
pub mod hpa;
#[path = "05_docker.rs"]
pub mod docker;

pub use deployment::DeploymentHandler;
pub use docker::DockerHandler;
pub use hpa::HpaHandler;
pub use job::JobHandler;
pub use service::{register_service_ports, ServiceHandler};
pub use volume_claim::PersistentVolumeClaimHandler;
