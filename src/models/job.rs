use super::{EnvVarValue, Workload, DEFAULT_BASE_IMAGE, DEFAULT_PULL_POLICY};
use std::collections::{BTreeMap, BTreeSet};

pub const RESTART_POLICY_ON_FAILURE: &str = "OnFailure";

/// Run-to-completion workload, built instead of a deployment when the entry
/// point carries a task schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobModel {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub image: String,
    pub image_pull_policy: String,
    /// Five-field cron expression; rendered as a CronJob when set
    pub schedule: Option<String>,
    pub restart_policy: String,
    pub backoff_limit: u32,
    pub env: BTreeMap<String, EnvVarValue>,
    pub base_image: String,
    pub registry: Option<String>,
    pub push: bool,
    pub build_image: bool,
    pub cmd: Option<String>,
    pub command_args: Vec<String>,
    pub single_yaml: bool,
}

impl Default for JobModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            labels: BTreeMap::new(),
            image: String::new(),
            image_pull_policy: DEFAULT_PULL_POLICY.to_string(),
            schedule: None,
            restart_policy: RESTART_POLICY_ON_FAILURE.to_string(),
            backoff_limit: 3,
            env: BTreeMap::new(),
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            registry: None,
            push: false,
            build_image: true,
            cmd: None,
            command_args: Vec::new(),
            single_yaml: false,
        }
    }
}

impl Workload for JobModel {
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
        BTreeSet::new()
    }

    fn is_service(&self) -> bool {
        false
    }
}
