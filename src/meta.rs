//! Schemas derived from confique `Config` structs.
//!
//! A `#[derive(confique::Config)]` struct already declares everything a
//! [`Schema`] needs: field names, `///` docs, defaults, `Option` fields and
//! `#[config(nested)]` sections. [`Schema::from_config`] walks its `META`
//! tree once and produces the equivalent declarations:
//!
//! - `Option<T>` fields become optional attributes with a null default.
//! - Fields with `#[config(default = ...)]` become optional attributes whose
//!   validator is the built-in type of the default.
//! - Other leaf fields become required, unvalidated attributes.
//! - Nested sections become components.

use std::sync::Arc;

use confique::Config;
use confique::meta::{Expr, FieldKind, LeafKind, Meta};
use serde_json::Value;
use tracing::debug;

use crate::schema::{AttributeDecl, ComponentDecl, Declaration, Schema};
use crate::types::TypeTag;

impl Schema {
    pub fn from_config<C: Config>() -> Arc<Schema> {
        let schema = from_meta(&C::META);
        debug!(
            config = C::META.name,
            declarations = schema.declarations().len(),
            "schema derived from config struct"
        );
        schema
    }
}

fn from_meta(meta: &Meta) -> Arc<Schema> {
    let declarations = meta
        .fields
        .iter()
        .map(|field| {
            let name = field.name.to_string();
            let description = describe(field.doc);
            match &field.kind {
                FieldKind::Leaf { kind, .. } => {
                    let default = match kind {
                        LeafKind::Required {
                            default: Some(expr),
                            ..
                        } => Some(expr_value(expr)),
                        LeafKind::Required { .. } => None,
                        _ => Some(Value::Null),
                    };
                    let validator = default.as_ref().and_then(TypeTag::of).map(Into::into);
                    Declaration::Attribute(AttributeDecl::new(
                        name,
                        default,
                        validator,
                        description,
                    ))
                }
                FieldKind::Nested { meta, .. } => {
                    Declaration::Component(ComponentDecl::new(name, from_meta(meta), description))
                }
            }
        })
        .collect();
    Arc::new(Schema::from_declarations(declarations))
}

fn expr_value(expr: &Expr) -> Value {
    serde_json::to_value(expr).unwrap_or(Value::Null)
}

fn describe(doc: &[&str]) -> Option<String> {
    if doc.is_empty() {
        return None;
    }
    let lines: Vec<&str> = doc.iter().map(|line| line.trim()).collect();
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::fixtures::test::{TestConfig, TestDbConfig};
    use serde_json::json;

    #[test]
    fn fields_keep_declaration_order() {
        let schema = Schema::from_config::<TestConfig>();
        let names: Vec<&str> = schema.declarations().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["host", "port", "debug", "database"]);
    }

    #[test]
    fn defaults_and_types_come_from_config() {
        let docs = Schema::from_config::<TestConfig>().documentation();
        assert_eq!(docs[".port"].default, Some(json!(8080)));
        assert_eq!(docs[".port"].type_name.as_deref(), Some("Integer"));
        assert_eq!(docs[".host"].default, Some(json!("localhost")));
        assert_eq!(docs[".debug"].type_name.as_deref(), Some("Boolean"));
        assert_eq!(
            docs[".database.pool_size"].description.as_deref(),
            Some("Connection pool size.")
        );
    }

    #[test]
    fn option_fields_are_optional() {
        let config = Schema::from_config::<TestConfig>().instantiate();
        assert!(config.config_errors().is_empty());
        assert_eq!(
            config.component("database").unwrap().value("url"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn configured_values_extract_into_config_struct() {
        let mut config = Schema::from_config::<TestConfig>().instantiate();
        let errors = config.configure_with(&json!({
            "port": "3000",
            "database": {"url": "postgres://db", "pool_size": 10}
        }));
        assert!(errors.is_empty());
        let typed: TestConfig = config.extract().unwrap();
        assert_eq!(typed.port, 3000);
        assert_eq!(typed.host, "localhost");
        assert_eq!(
            typed.database,
            TestDbConfig {
                url: Some("postgres://db".into()),
                pool_size: 10,
            }
        );
    }

    #[test]
    fn typed_defaults_validate_input() {
        let mut config = Schema::from_config::<TestConfig>().instantiate();
        let errors = config.configure_with(&json!({"debug": "sometimes"}));
        assert!(matches!(errors[".debug"], FieldError::InvalidValue(_)));
    }
}
