//! TLS block recognizer
//!
//! Reads the `secureSocket` field of an HTTP listener configuration mapping:
//!
//! ```text
//! {
//!     secureSocket: {
//!         key: { certFile: "...", keyFile: "..." },
//!         mutualSsl: { cert: "..." }
//!     }
//! }
//! ```

use super::intent::{MutualSslConfig, SecureSocketConfig, TlsConfig};
use crate::syntax::{Expression, FunctionArgument, MappingConstructor};
use std::collections::BTreeMap;

/// Parses the TLS block of a listener configuration mapping
///
/// Returns `None` when the mapping has no `secureSocket` field or when its
/// value is not itself a mapping.
pub fn parse_listener_config(mapping: &MappingConstructor) -> Option<TlsConfig> {
    let secure_socket = mapping
        .specific_fields()
        .find(|(name, _)| *name == "secureSocket")
        .and_then(|(_, value)| value)?
        .as_mapping()?;

    let mut config = TlsConfig::default();
    for (name, value) in secure_socket.specific_fields() {
        match name {
            "key" => config.secure_socket = Some(parse_key(value)),
            "mutualSsl" => config.mutual_ssl = Some(parse_mutual_ssl(value)),
            _ => {}
        }
    }
    Some(config)
}

/// Resolves the TLS config passed as a listener constructor argument
///
/// An inline mapping is parsed in place; a name reference is looked up in
/// the `ListenerConfiguration` variables seen so far.
pub fn resolve_config_argument(
    argument: &FunctionArgument,
    named_configs: &BTreeMap<String, TlsConfig>,
) -> Option<TlsConfig> {
    match argument.positional()? {
        Expression::MappingConstructor(mapping) => parse_listener_config(mapping),
        Expression::SimpleNameReference { name } => named_configs.get(name).cloned(),
        _ => None,
    }
}

fn parse_key(value: Option<&Expression>) -> SecureSocketConfig {
    let mut key = SecureSocketConfig::default();
    let Some(mapping) = value.and_then(Expression::as_mapping) else {
        return key;
    };

    for (name, value) in mapping.specific_fields() {
        let text = value.and_then(Expression::string_value);
        match name {
            "certFile" => key.cert_file = text,
            "keyFile" => key.key_file = text,
            "path" => key.path = text,
            _ => {}
        }
    }
    key
}

fn parse_mutual_ssl(value: Option<&Expression>) -> MutualSslConfig {
    let mut mutual = MutualSslConfig::default();
    let Some(mapping) = value.and_then(Expression::as_mapping) else {
        return mutual;
    };

    for (name, cert) in mapping.specific_fields() {
        if name != "cert" {
            continue;
        }
        mutual.path = match cert {
            Some(Expression::MappingConstructor(cert_mapping)) => cert_mapping
                .field("path")
                .and_then(Expression::string_value),
            Some(other) => other.string_value(),
            None => None,
        };
    }
    mutual
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> MappingConstructor {
        let expr: Expression = serde_yaml::from_str(yaml).unwrap();
        expr.as_mapping().cloned().unwrap()
    }

    #[test]
    fn test_cert_and_key_files() {
        let config = parse_listener_config(&mapping(
            r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: identifier_token, text: secureSocket }
    value:
      kind: mapping_constructor
      fields:
        - kind: specific_field
          field_name: { kind: identifier_token, text: key }
          value:
            kind: mapping_constructor
            fields:
              - kind: specific_field
                field_name: { kind: identifier_token, text: certFile }
                value: { kind: string_literal, text: "\"/path/cert.pem\"" }
              - kind: specific_field
                field_name: { kind: identifier_token, text: keyFile }
                value: { kind: string_literal, text: "\"/path/key.pem\"" }
"#,
        ))
        .unwrap();

        let key = config.secure_socket.unwrap();
        assert_eq!(key.cert_file.as_deref(), Some("/path/cert.pem"));
        assert_eq!(key.key_file.as_deref(), Some("/path/key.pem"));
        assert_eq!(key.path, None);
        assert!(config.mutual_ssl.is_none());
    }

    #[test]
    fn test_keystore_path_and_mutual_cert_mapping() {
        let config = parse_listener_config(&mapping(
            r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: identifier_token, text: host }
    value: { kind: string_literal, text: "\"0.0.0.0\"" }
  - kind: specific_field
    field_name: { kind: identifier_token, text: secureSocket }
    value:
      kind: mapping_constructor
      fields:
        - kind: specific_field
          field_name: { kind: identifier_token, text: key }
          value:
            kind: mapping_constructor
            fields:
              - kind: specific_field
                field_name: { kind: identifier_token, text: path }
                value: { kind: string_literal, text: "\"/store/keystore.p12\"" }
              - kind: specific_field
                field_name: { kind: identifier_token, text: password }
                value: { kind: string_literal, text: "\"secret\"" }
        - kind: specific_field
          field_name: { kind: identifier_token, text: mutualSsl }
          value:
            kind: mapping_constructor
            fields:
              - kind: specific_field
                field_name: { kind: identifier_token, text: cert }
                value:
                  kind: mapping_constructor
                  fields:
                    - kind: specific_field
                      field_name: { kind: identifier_token, text: path }
                      value: { kind: string_literal, text: "\"/store/truststore.p12\"" }
"#,
        ))
        .unwrap();

        assert_eq!(
            config.secure_socket.unwrap().path.as_deref(),
            Some("/store/keystore.p12")
        );
        assert_eq!(
            config.mutual_ssl.unwrap().path.as_deref(),
            Some("/store/truststore.p12")
        );
    }

    #[test]
    fn test_mutual_cert_as_plain_string() {
        let config = parse_listener_config(&mapping(
            r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: identifier_token, text: secureSocket }
    value:
      kind: mapping_constructor
      fields:
        - kind: specific_field
          field_name: { kind: identifier_token, text: mutualSsl }
          value:
            kind: mapping_constructor
            fields:
              - kind: specific_field
                field_name: { kind: identifier_token, text: cert }
                value: { kind: string_literal, text: "\"/trust/ca.crt\"" }
"#,
        ))
        .unwrap();

        assert!(config.secure_socket.is_none());
        assert_eq!(config.mutual_ssl.unwrap().path.as_deref(), Some("/trust/ca.crt"));
    }

    #[test]
    fn test_secure_socket_reference_yields_nothing() {
        let config = parse_listener_config(&mapping(
            r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: identifier_token, text: secureSocket }
    value: { kind: simple_name_reference, name: socketConfig }
"#,
        ));
        assert!(config.is_none());
    }

    #[test]
    fn test_non_string_values_stay_unset() {
        let config = parse_listener_config(&mapping(
            r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: identifier_token, text: secureSocket }
    value:
      kind: mapping_constructor
      fields:
        - kind: specific_field
          field_name: { kind: identifier_token, text: key }
          value:
            kind: mapping_constructor
            fields:
              - kind: specific_field
                field_name: { kind: identifier_token, text: certFile }
                value: { kind: simple_name_reference, name: certPath }
"#,
        ))
        .unwrap();
        assert_eq!(config.secure_socket.unwrap().cert_file, None);
    }

    #[test]
    fn test_resolve_named_config_argument() {
        let mut named = BTreeMap::new();
        named.insert("httpsConfig".to_string(), TlsConfig::default());

        let by_name = FunctionArgument::PositionalArg {
            expression: Expression::SimpleNameReference {
                name: "httpsConfig".to_string(),
            },
        };
        assert_eq!(
            resolve_config_argument(&by_name, &named),
            Some(TlsConfig::default())
        );

        let unknown = FunctionArgument::PositionalArg {
            expression: Expression::SimpleNameReference {
                name: "other".to_string(),
            },
        };
        assert_eq!(resolve_config_argument(&unknown, &named), None);

        let named_arg = FunctionArgument::NamedArg {
            argument_name: "config".to_string(),
            expression: Expression::SimpleNameReference {
                name: "httpsConfig".to_string(),
            },
        };
        assert_eq!(resolve_config_argument(&named_arg, &named), None);
    }
}
