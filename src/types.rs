use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{FieldError, SchemaError};

/// A key into a target: a mapping key, or a sequence index.
///
/// Mapping keys in source data become [`Key::Str`]; the position of an
/// element in a source sequence becomes [`Key::Int`]. Dictionary keys that
/// pass through a key coercer may change variant (`"22"` → `22`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl Key {
    /// Path segment used by named-attribute targets: `.name`.
    pub fn attribute_path(&self) -> String {
        format!(".{self}")
    }

    /// Path segment used by keyed and indexed containers: `["name"]` or `[3]`.
    ///
    /// String keys are rendered as JSON string literals, so quotes and
    /// backslashes in the key stay unambiguous.
    pub fn entry_path(&self) -> String {
        match self {
            Key::Str(s) => format!("[{}]", Value::String(s.clone())),
            Key::Int(i) => format!("[{i}]"),
        }
    }

    /// A non-negative sequence index, if the key is (or spells) one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Int(i) => usize::try_from(*i).ok(),
            Key::Str(s) => s.parse().ok(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Str(s) => Value::String(s.clone()),
            Key::Int(i) => Value::from(*i),
        }
    }

    /// Convert the output of a key coercer back into a key.
    pub fn from_value(value: Value) -> Result<Key, FieldError> {
        match value {
            Value::String(s) => Ok(Key::Str(s)),
            Value::Number(n) => n
                .as_i64()
                .map(Key::Int)
                .ok_or_else(|| FieldError::invalid(format!("{n} is not a valid key"))),
            other => Err(FieldError::invalid(format!(
                "keys must be strings or integers, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Split a path such as `.services["app"].ports[0]` into its keys.
    ///
    /// Returns `None` if the path is malformed.
    pub fn parse_path(path: &str) -> Option<Vec<Key>> {
        let mut keys = Vec::new();
        let mut rest = path;
        while !rest.is_empty() {
            if let Some(after_dot) = rest.strip_prefix('.') {
                let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
                if end == 0 {
                    return None;
                }
                keys.push(Key::Str(after_dot[..end].to_string()));
                rest = &after_dot[end..];
            } else if let Some(after_bracket) = rest.strip_prefix('[') {
                if after_bracket.starts_with('"') {
                    let mut stream =
                        serde_json::Deserializer::from_str(after_bracket).into_iter::<String>();
                    let name = stream.next()?.ok()?;
                    let consumed = stream.byte_offset();
                    rest = after_bracket[consumed..].strip_prefix(']')?;
                    keys.push(Key::Str(name));
                } else {
                    let end = after_bracket.find(']')?;
                    let index = after_bracket[..end].parse().ok()?;
                    keys.push(Key::Int(index));
                    rest = &after_bracket[end + 1..];
                }
            } else {
                return None;
            }
        }
        Some(keys)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s}"),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl TryFrom<usize> for Key {
    type Error = FieldError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        i64::try_from(index)
            .map(Key::Int)
            .map_err(|_| FieldError::invalid(format!("index {index} is out of range")))
    }
}

/// Built-in coercions, addressable by name when declaring attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Integer,
    Float,
    String,
    Boolean,
    Array,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::String => "String",
            TypeTag::Boolean => "Boolean",
            TypeTag::Array => "Array",
        }
    }

    /// The tag matching a concrete (non-null, non-mapping) value.
    pub fn of(value: &Value) -> Option<TypeTag> {
        match value {
            Value::Bool(_) => Some(TypeTag::Boolean),
            Value::Number(n) if n.is_f64() => Some(TypeTag::Float),
            Value::Number(_) => Some(TypeTag::Integer),
            Value::String(_) => Some(TypeTag::String),
            Value::Array(_) => Some(TypeTag::Array),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "integer" | "int" | "i64" => Ok(TypeTag::Integer),
            "float" | "f64" => Ok(TypeTag::Float),
            "string" | "str" => Ok(TypeTag::String),
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "array" => Ok(TypeTag::Array),
            _ => Err(SchemaError::UnknownType(s.to_string())),
        }
    }
}

/// Short name of a value's shape, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
