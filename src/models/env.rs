//! Container environment variable values

/// Value of a container environment variable
///
/// Either a literal, or one of the `valueFrom` sources Kubernetes supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvVarValue {
    Value(String),
    FieldRef {
        field_path: String,
    },
    SecretKeyRef {
        name: String,
        key: String,
    },
    ResourceFieldRef {
        container_name: Option<String>,
        resource: String,
    },
    ConfigMapKeyRef {
        name: String,
        key: String,
    },
}

impl EnvVarValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvVarValue::Value(value.into())
    }
}
