//! Listener recognizers for module-level declarations

use super::intent::{ListenerInfo, TlsConfig};
use super::tls;
use crate::syntax::{
    BindingPattern, Expression, ListenerDeclaration, ModuleVariableDeclaration, TypeDescriptor,
};
use std::collections::BTreeMap;

const HTTP_MODULE: &str = "http";
const LISTENER_TYPE: &str = "Listener";
const LISTENER_CONFIG_TYPE: &str = "ListenerConfiguration";
const INT_TYPE: &str = "int";

/// What a module-level variable contributes to the intent model
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBinding {
    Listener(ListenerInfo),
    ListenerConfig { name: String, config: TlsConfig },
    IntVariable { name: String, value: u16 },
}

/// Recognizes `http:Listener`, `http:ListenerConfiguration` and `int` variables
pub fn recognize_module_variable(
    decl: &ModuleVariableDeclaration,
    named_configs: &BTreeMap<String, TlsConfig>,
) -> Option<ModuleBinding> {
    let BindingPattern::CaptureBindingPattern { variable_name } = &decl.binding_pattern else {
        return None;
    };
    let initializer = decl.initializer.as_ref()?;

    match &decl.type_descriptor {
        TypeDescriptor::QualifiedNameReference {
            module_prefix,
            identifier,
        } if module_prefix == HTTP_MODULE => match identifier.as_str() {
            LISTENER_TYPE => {
                let Expression::CheckExpression { expression } = initializer else {
                    return None;
                };
                listener_from_initializer(variable_name, expression, named_configs)
                    .map(ModuleBinding::Listener)
            }
            LISTENER_CONFIG_TYPE => {
                let config = tls::parse_listener_config(initializer.as_mapping()?)?;
                Some(ModuleBinding::ListenerConfig {
                    name: variable_name.clone(),
                    config,
                })
            }
            _ => None,
        },
        TypeDescriptor::BuiltinSimpleName { name } if name == INT_TYPE => {
            Some(ModuleBinding::IntVariable {
                name: variable_name.clone(),
                value: initializer.port_value()?,
            })
        }
        _ => None,
    }
}

/// Recognizes `listener http:Listener name = new(...)`
pub fn recognize_listener_declaration(
    decl: &ListenerDeclaration,
    named_configs: &BTreeMap<String, TlsConfig>,
) -> Option<ListenerInfo> {
    let initializer = match &decl.initializer {
        Expression::CheckExpression { expression } => expression.as_ref(),
        other => other,
    };
    listener_from_initializer(&decl.variable_name, initializer, named_configs)
}

/// Builds a listener from an implicit `new(port, config?)` initializer
///
/// A name reference in port position leaves the port at 0 and remembers the
/// referenced variable so the populator can resolve it later.
pub fn listener_from_initializer(
    name: &str,
    initializer: &Expression,
    named_configs: &BTreeMap<String, TlsConfig>,
) -> Option<ListenerInfo> {
    let Expression::ImplicitNewExpression {
        arguments: Some(arguments),
    } = initializer
    else {
        return None;
    };

    let listener = match arguments.first()?.positional()? {
        Expression::SimpleNameReference { name: port_ref } => {
            ListenerInfo::new(name, 0).with_port_ref(port_ref.clone())
        }
        literal => ListenerInfo::new(name, literal.port_value()?),
    };

    let config = arguments
        .get(1)
        .and_then(|arg| tls::resolve_config_argument(arg, named_configs));
    Some(listener.with_config(config))
}
