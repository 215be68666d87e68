//! Deployment-intent model produced by the extractor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Certificate and key material of a TLS-enabled listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_socket: Option<SecureSocketConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutual_ssl: Option<MutualSslConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureSocketConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    /// Keystore path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualSslConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl TlsConfig {
    /// Every file path referenced by the config, in declaration order
    pub fn files(&self) -> Vec<&str> {
        let mut files = Vec::new();
        if let Some(socket) = &self.secure_socket {
            files.extend(
                [&socket.cert_file, &socket.key_file, &socket.path]
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            );
        }
        if let Some(path) = self.mutual_ssl.as_ref().and_then(|m| m.path.as_deref()) {
            files.push(path);
        }
        files
    }
}

/// A network endpoint a service binds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerInfo {
    pub name: String,
    /// 0 when the port is not a literal
    pub port: u16,
    /// Variable the port was read from, when not a literal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TlsConfig>,
}

impl ListenerInfo {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            port_ref: None,
            config: None,
        }
    }

    pub fn with_port_ref(mut self, port_ref: impl Into<String>) -> Self {
        self.port_ref = Some(port_ref.into());
        self
    }

    pub fn with_config(mut self, config: Option<TlsConfig>) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub listener: ListenerInfo,
    pub path: String,
    pub resources: Vec<ResourceInfo>,
}

/// Cron-style schedule of the entry point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub minutes: Option<String>,
    pub hours: Option<String>,
    pub day_of_month: Option<String>,
    pub month_of_year: Option<String>,
    pub days_of_week: Option<String>,
}

impl Task {
    /// Five-field cron expression with `*` for unset fields
    pub fn schedule(&self) -> String {
        [
            &self.minutes,
            &self.hours,
            &self.day_of_month,
            &self.month_of_year,
            &self.days_of_week,
        ]
        .iter()
        .map(|field| field.as_deref().unwrap_or("*"))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Everything the extractor learned about one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentIntent {
    pub listeners: Vec<ListenerInfo>,
    pub services: Vec<ServiceInfo>,
    /// `ListenerConfiguration` variables by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_configs: BTreeMap<String, TlsConfig>,
    /// Module-level `int` variables with literal values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub int_variables: BTreeMap<String, u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

impl DeploymentIntent {
    /// Listener declared under `name`, or an unresolved placeholder
    pub fn listener_or_placeholder(&self, name: &str) -> ListenerInfo {
        self.listeners
            .iter()
            .find(|l| l.name == name)
            .cloned()
            .unwrap_or_else(|| ListenerInfo::new(name, 0))
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.services.is_empty() && self.task.is_none()
    }
}
