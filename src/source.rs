//! Reducing serialized documents to source data.
//!
//! The mapper only ever sees `serde_json::Value`: scalars, ordered mappings
//! and ordered sequences. These helpers parse a document into that shape.
//! Mapping order from the document is preserved.

use serde_json::Value;
#[cfg(any(feature = "toml", feature = "yaml"))]
use serde_json::{Map, Number};

use crate::error::Error;

pub use crate::merge::deep_merge;

pub fn from_json_str(input: &str) -> Result<Value, Error> {
    serde_json::from_str(input).map_err(|e| Error::Parse {
        format: "JSON",
        reason: e.to_string(),
    })
}

#[cfg(any(feature = "toml", feature = "yaml"))]
fn non_finite(format: &'static str, f: f64) -> Error {
    Error::Parse {
        format,
        reason: format!("{f} cannot be represented as source data"),
    }
}

/// Parse a TOML document. Datetimes become their RFC 3339 strings.
#[cfg(feature = "toml")]
pub fn from_toml_str(input: &str) -> Result<Value, Error> {
    let table = input.parse::<toml::Table>().map_err(|e| Error::Parse {
        format: "TOML",
        reason: e.to_string(),
    })?;
    from_toml(toml::Value::Table(table))
}

#[cfg(feature = "toml")]
fn from_toml(value: toml::Value) -> Result<Value, Error> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::Number(Number::from_f64(f).ok_or_else(|| non_finite("TOML", f))?),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_toml).collect::<Result<_, _>>()?)
        }
        toml::Value::Table(table) => {
            let mut map = Map::new();
            for (key, value) in table {
                map.insert(key, from_toml(value)?);
            }
            Value::Object(map)
        }
    })
}

/// Parse a YAML document. Scalar mapping keys are stringified (`1: a`
/// becomes `{"1": "a"}`); tags are dropped.
#[cfg(feature = "yaml")]
pub fn from_yaml_str(input: &str) -> Result<Value, Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(input).map_err(|e| Error::Parse {
        format: "YAML",
        reason: e.to_string(),
    })?;
    from_yaml(value)
}

#[cfg(feature = "yaml")]
fn from_yaml(value: serde_yaml::Value) -> Result<Value, Error> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Value::Number(Number::from_f64(f).ok_or_else(|| non_finite("YAML", f))?)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(from_yaml).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, from_yaml(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

#[cfg(feature = "yaml")]
fn yaml_key(key: serde_yaml::Value) -> Result<String, Error> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(Error::Parse {
            format: "YAML",
            reason: "mapping keys must be scalars".into(),
        }),
    }
}
