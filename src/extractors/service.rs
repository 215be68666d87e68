//! Service declaration recognizer

use super::intent::{DeploymentIntent, ListenerInfo, ResourceInfo, ServiceInfo};
use super::tls;
use crate::syntax::{Expression, PathToken, ServiceDeclaration, ServiceMember};

/// Concatenates `/`, `.` and identifier tokens of a resource path
pub fn path_from_tokens(tokens: &[PathToken]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            PathToken::SlashToken => Some("/"),
            PathToken::DotToken => Some("."),
            PathToken::IdentifierToken { text } => Some(text.as_str()),
            PathToken::Other => None,
        })
        .collect()
}

/// Outcome of recognizing one service declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceFragment {
    pub service: ServiceInfo,
    /// Listener constructed inline by the service, to be appended to the
    /// module's listener list
    pub inline_listener: Option<ListenerInfo>,
}

/// Recognizes a service and resolves the listener it is attached to
///
/// Listener references are resolved against `intent` as built so far. When
/// the attach point cannot be understood the service still gets a listener,
/// named after the service path with port 0.
pub fn recognize_service(decl: &ServiceDeclaration, intent: &DeploymentIntent) -> ServiceFragment {
    let path = path_from_tokens(&decl.absolute_resource_path);

    let (listener, inline_listener) = match decl.expressions.first() {
        Some(Expression::SimpleNameReference { name }) => {
            (intent.listener_or_placeholder(name), None)
        }
        Some(Expression::ExplicitNewExpression { arguments, .. }) => {
            let listener = match arguments.first().and_then(|arg| arg.positional()) {
                Some(Expression::SimpleNameReference { name }) => {
                    Some(intent.listener_or_placeholder(name))
                }
                Some(literal) => literal
                    .port_value()
                    .map(|port| ListenerInfo::new(path.clone(), port)),
                None => None,
            };

            match listener {
                Some(listener) => {
                    let config = arguments
                        .get(1)
                        .and_then(|arg| tls::resolve_config_argument(arg, &intent.named_configs));
                    let listener = match config {
                        Some(config) => listener.with_config(Some(config)),
                        None => listener,
                    };
                    (listener.clone(), Some(listener))
                }
                None => (ListenerInfo::new(path.clone(), 0), None),
            }
        }
        _ => (ListenerInfo::new(path.clone(), 0), None),
    };

    let resources = decl
        .members
        .iter()
        .filter_map(|member| match member {
            ServiceMember::ResourceAccessorDefinition {
                function_name,
                relative_resource_path,
            } => Some(ResourceInfo {
                method: function_name.clone(),
                path: path_from_tokens(relative_resource_path),
            }),
            ServiceMember::Other => None,
        })
        .collect();

    ServiceFragment {
        service: ServiceInfo {
            listener,
            path,
            resources,
        },
        inline_listener,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(yaml: &str) -> ServiceDeclaration {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_path_from_tokens() {
        let tokens = vec![
            PathToken::SlashToken,
            PathToken::IdentifierToken {
                text: "api".to_string(),
            },
            PathToken::SlashToken,
            PathToken::IdentifierToken {
                text: "v1".to_string(),
            },
            PathToken::DotToken,
            PathToken::IdentifierToken {
                text: "json".to_string(),
            },
            PathToken::Other,
        ];
        assert_eq!(path_from_tokens(&tokens), "/api/v1.json");
        assert_eq!(path_from_tokens(&[]), "");
    }

    #[test]
    fn test_service_on_declared_listener() {
        let decl = service(
            r#"
absolute_resource_path:
  - kind: slash_token
  - { kind: identifier_token, text: helloWorld }
expressions:
  - { kind: simple_name_reference, name: helloEP }
members:
  - kind: resource_accessor_definition
    function_name: get
    relative_resource_path:
      - { kind: identifier_token, text: sayHello }
  - kind: object_field
  - kind: resource_accessor_definition
    function_name: post
    relative_resource_path:
      - { kind: identifier_token, text: greet }
      - kind: slash_token
      - { kind: identifier_token, text: all }
"#,
        );
        let intent = DeploymentIntent {
            listeners: vec![ListenerInfo::new("helloEP", 9090)],
            ..Default::default()
        };

        let fragment = recognize_service(&decl, &intent);
        assert_eq!(fragment.service.path, "/helloWorld");
        assert_eq!(fragment.service.listener, ListenerInfo::new("helloEP", 9090));
        assert!(fragment.inline_listener.is_none());
        assert_eq!(
            fragment.service.resources,
            vec![
                ResourceInfo {
                    method: "get".to_string(),
                    path: "sayHello".to_string()
                },
                ResourceInfo {
                    method: "post".to_string(),
                    path: "greet/all".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_listener_reference_falls_back_to_zero_port() {
        let decl = service(
            r#"
expressions:
  - { kind: simple_name_reference, name: missingEP }
"#,
        );
        let fragment = recognize_service(&decl, &DeploymentIntent::default());
        assert_eq!(fragment.service.listener, ListenerInfo::new("missingEP", 0));
    }

    #[test]
    fn test_inline_listener_with_literal_port() {
        let decl = service(
            r#"
absolute_resource_path:
  - kind: slash_token
  - { kind: identifier_token, text: hello }
expressions:
  - kind: explicit_new_expression
    type_descriptor: { kind: qualified_name_reference, module_prefix: http, identifier: Listener }
    arguments:
      - kind: positional_arg
        expression: { kind: numeric_literal, text: "9091" }
"#,
        );

        let fragment = recognize_service(&decl, &DeploymentIntent::default());
        assert_eq!(fragment.service.listener, ListenerInfo::new("/hello", 9091));
        assert_eq!(fragment.inline_listener, Some(ListenerInfo::new("/hello", 9091)));
    }

    #[test]
    fn test_inline_listener_wrapping_declared_listener() {
        let decl = service(
            r#"
absolute_resource_path:
  - kind: slash_token
  - { kind: identifier_token, text: graphql }
expressions:
  - kind: explicit_new_expression
    type_descriptor: { kind: qualified_name_reference, module_prefix: graphql, identifier: Listener }
    arguments:
      - kind: positional_arg
        expression: { kind: simple_name_reference, name: httpListener }
"#,
        );
        let intent = DeploymentIntent {
            listeners: vec![ListenerInfo::new("httpListener", 4000)],
            ..Default::default()
        };

        let fragment = recognize_service(&decl, &intent);
        assert_eq!(fragment.service.listener.port, 4000);
        assert_eq!(
            fragment.inline_listener.map(|l| l.name),
            Some("httpListener".to_string())
        );
    }

    #[test]
    fn test_inline_listener_without_arguments_uses_placeholder() {
        let decl = service(
            r#"
absolute_resource_path:
  - kind: slash_token
expressions:
  - kind: explicit_new_expression
    type_descriptor: { kind: qualified_name_reference, module_prefix: http, identifier: Listener }
"#,
        );
        let fragment = recognize_service(&decl, &DeploymentIntent::default());
        assert_eq!(fragment.service.listener, ListenerInfo::new("/", 0));
        assert!(fragment.inline_listener.is_none());
    }

    #[test]
    fn test_service_without_expressions_uses_placeholder() {
        let decl = service("absolute_resource_path: []");
        let fragment = recognize_service(&decl, &DeploymentIntent::default());
        assert_eq!(fragment.service.listener, ListenerInfo::new("", 0));
        assert!(fragment.service.resources.is_empty());
    }
}
