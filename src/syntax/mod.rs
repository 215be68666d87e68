//! Syntax tree consumed by the pattern extractor
//!
//! The tree is produced by the language front end and handed over as JSON or
//! YAML. Only the node kinds the extractor looks at are modelled; every other
//! kind deserializes into an `Other` variant so that any dump loads, and the
//! extractor simply skips what it does not understand.
//!
//! ```yaml
//! members:
//!   - kind: listener_declaration
//!     variable_name: helloEP
//!     initializer:
//!       kind: implicit_new_expression
//!       arguments:
//!         - kind: positional_arg
//!           expression: { kind: numeric_literal, text: "9090" }
//! ```

use crate::error::{BuildError, BuildResult};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulePart {
    #[serde(default)]
    pub members: Vec<ModuleMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleMember {
    ModuleVariableDeclaration(ModuleVariableDeclaration),
    ListenerDeclaration(ListenerDeclaration),
    ServiceDeclaration(ServiceDeclaration),
    FunctionDefinition(FunctionDefinition),
    #[serde(other)]
    Other,
}

/// `[qualifiers] type name = initializer;` at module level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleVariableDeclaration {
    #[serde(default)]
    pub qualifiers: Vec<String>,
    pub type_descriptor: TypeDescriptor,
    pub binding_pattern: BindingPattern,
    #[serde(default)]
    pub initializer: Option<Expression>,
}

/// `listener module:Listener name = initializer;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerDeclaration {
    #[serde(default)]
    pub type_descriptor: Option<TypeDescriptor>,
    pub variable_name: String,
    pub initializer: Expression,
}

/// `service /path on expr, ... { members }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDeclaration {
    #[serde(default)]
    pub absolute_resource_path: Vec<PathToken>,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub members: Vec<ServiceMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceMember {
    /// `resource function get path/to() { ... }`
    ResourceAccessorDefinition {
        function_name: String,
        #[serde(default)]
        relative_resource_path: Vec<PathToken>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub function_name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub annot_reference: NameReference,
    #[serde(default)]
    pub annot_value: Option<MappingConstructor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    QualifiedNameReference {
        module_prefix: String,
        identifier: String,
    },
    /// Builtin types such as `int` or `string`
    BuiltinSimpleName { name: String },
    #[serde(other)]
    Other,
}

impl TypeDescriptor {
    /// Returns `(module_prefix, identifier)` for qualified types
    pub fn qualified(&self) -> Option<(&str, &str)> {
        match self {
            TypeDescriptor::QualifiedNameReference {
                module_prefix,
                identifier,
            } => Some((module_prefix, identifier)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingPattern {
    CaptureBindingPattern { variable_name: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameReference {
    QualifiedNameReference {
        module_prefix: String,
        identifier: String,
    },
    SimpleNameReference {
        name: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    NumericLiteral {
        text: String,
    },
    /// Token text still carries its surrounding quotes
    StringLiteral {
        text: String,
    },
    SimpleNameReference {
        name: String,
    },
    QualifiedNameReference {
        module_prefix: String,
        identifier: String,
    },
    CheckExpression {
        expression: Box<Expression>,
    },
    /// `new(...)`; `arguments` is `None` for a bare `new`
    ImplicitNewExpression {
        #[serde(default)]
        arguments: Option<Vec<FunctionArgument>>,
    },
    /// `new module:Type(...)`
    ExplicitNewExpression {
        type_descriptor: TypeDescriptor,
        #[serde(default)]
        arguments: Vec<FunctionArgument>,
    },
    MappingConstructor(MappingConstructor),
    #[serde(other)]
    Other,
}

impl Expression {
    /// Value of a string literal with its quotes removed
    pub fn string_value(&self) -> Option<String> {
        match self {
            Expression::StringLiteral { text } => {
                let unquoted = text
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .unwrap_or(text);
                Some(unquoted.to_string())
            }
            _ => None,
        }
    }

    /// Integer value of a numeric literal that fits a port
    pub fn port_value(&self) -> Option<u16> {
        match self {
            Expression::NumericLiteral { text } => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn name_reference(&self) -> Option<&str> {
        match self {
            Expression::SimpleNameReference { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&MappingConstructor> {
        match self {
            Expression::MappingConstructor(mapping) => Some(mapping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionArgument {
    PositionalArg {
        expression: Expression,
    },
    NamedArg {
        argument_name: String,
        expression: Expression,
    },
    RestArg {
        expression: Expression,
    },
}

impl FunctionArgument {
    pub fn positional(&self) -> Option<&Expression> {
        match self {
            FunctionArgument::PositionalArg { expression } => Some(expression),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingConstructor {
    #[serde(default)]
    pub fields: Vec<MappingField>,
}

impl MappingConstructor {
    /// Specific fields whose name is a plain identifier, in source order
    pub fn specific_fields(&self) -> impl Iterator<Item = (&str, Option<&Expression>)> {
        self.fields.iter().filter_map(|field| match field {
            MappingField::SpecificField { field_name, value } => field_name
                .identifier()
                .map(|name| (name, value.as_ref())),
            MappingField::Other => None,
        })
    }

    /// Value of the first specific field called `name`
    pub fn field(&self, name: &str) -> Option<&Expression> {
        self.specific_fields()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingField {
    SpecificField {
        field_name: FieldName,
        #[serde(default)]
        value: Option<Expression>,
    },
    /// Spread and computed-name fields
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldName {
    IdentifierToken { text: String },
    StringLiteral { text: String },
}

impl FieldName {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            FieldName::IdentifierToken { text } => Some(text),
            FieldName::StringLiteral { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathToken {
    SlashToken,
    DotToken,
    IdentifierToken {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Serialized form of a syntax tree dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Json,
    Yaml,
}

impl TreeFormat {
    /// Picks the format from the file extension; anything but JSON is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TreeFormat::Json,
            _ => TreeFormat::Yaml,
        }
    }
}

impl ModulePart {
    pub fn parse(content: &str, format: TreeFormat) -> Result<Self, String> {
        match format {
            TreeFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            TreeFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> BuildResult<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| BuildError::io(path, e))?;
        Self::parse(&content, TreeFormat::from_path(path)).map_err(|cause| {
            BuildError::SyntaxTree {
                path: path.to_path_buf(),
                cause,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_parse_listener_declaration_yaml() {
        let yaml = r#"
members:
  - kind: listener_declaration
    variable_name: helloEP
    initializer:
      kind: implicit_new_expression
      arguments:
        - kind: positional_arg
          expression: { kind: numeric_literal, text: "9090" }
"#;
        let module = ModulePart::parse(yaml, TreeFormat::Yaml).unwrap();
        assert_eq!(module.members.len(), 1);
        match &module.members[0] {
            ModuleMember::ListenerDeclaration(decl) => {
                assert_eq!(decl.variable_name, "helloEP");
                match &decl.initializer {
                    Expression::ImplicitNewExpression {
                        arguments: Some(args),
                    } => {
                        assert_eq!(args[0].positional().unwrap().port_value(), Some(9090));
                    }
                    other => panic!("unexpected initializer {:?}", other),
                }
            }
            other => panic!("unexpected member {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kinds_become_other() {
        let json = r#"{
            "members": [
                {"kind": "type_definition", "name": "Person"},
                {"kind": "function_definition", "function_name": "helper"}
            ]
        }"#;
        let module = ModulePart::parse(json, TreeFormat::Json).unwrap();
        assert_eq!(module.members[0], ModuleMember::Other);
        assert!(matches!(module.members[1], ModuleMember::FunctionDefinition(_)));
    }

    #[test]
    fn test_string_value_strips_quotes() {
        let expr = Expression::StringLiteral {
            text: "\"/path/cert.pem\"".to_string(),
        };
        assert_eq!(expr.string_value(), Some("/path/cert.pem".to_string()));

        let numeric = Expression::NumericLiteral {
            text: "1".to_string(),
        };
        assert_eq!(numeric.string_value(), None);
    }

    #[test]
    fn test_port_value_rejects_out_of_range() {
        let expr = Expression::NumericLiteral {
            text: "70000".to_string(),
        };
        assert_eq!(expr.port_value(), None);
    }

    #[test]
    fn test_mapping_field_lookup_ignores_string_keys() {
        let yaml = r#"
kind: mapping_constructor
fields:
  - kind: specific_field
    field_name: { kind: string_literal, text: "\"key\"" }
    value: { kind: string_literal, text: "\"a\"" }
  - kind: specific_field
    field_name: { kind: identifier_token, text: key }
    value: { kind: string_literal, text: "\"b\"" }
  - kind: spread_field
"#;
        let expr: Expression = serde_yaml::from_str(yaml).unwrap();
        let mapping = expr.as_mapping().unwrap();
        assert_eq!(mapping.specific_fields().count(), 1);
        assert_eq!(
            mapping.field("key").and_then(Expression::string_value),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_tree_format_from_path() {
        assert_eq!(TreeFormat::from_path(Path::new("a.json")), TreeFormat::Json);
        assert_eq!(TreeFormat::from_path(Path::new("a.yaml")), TreeFormat::Yaml);
        assert_eq!(TreeFormat::from_path(Path::new("a")), TreeFormat::Yaml);
    }

    #[test]
    fn test_load_reports_syntax_errors_with_path() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/module.json", "{ not json");

        let err = ModulePart::load(&fs, Path::new("/src/module.json")).unwrap_err();
        assert!(matches!(err, BuildError::SyntaxTree { .. }));
        assert!(err.to_string().contains("/src/module.json"));
    }
}
