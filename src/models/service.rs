use std::collections::BTreeMap;

/// One exposed listener, rendered as a `v1/Service`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub port: u16,
    pub target_port: u16,
    pub port_name: String,
    pub protocol: String,
    /// Value of the `app` selector label
    pub selector: String,
    pub service_type: String,
    /// Listener is TLS-enabled
    pub tls: bool,
}
