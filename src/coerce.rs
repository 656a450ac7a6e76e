//! Validators and coercers: single-argument functions that turn a raw source
//! value into the value stored on an attribute, or reject it.
//!
//! A [`Coercer`] is built from a closure ([`Coercer::new`]), from a built-in
//! [`TypeTag`], or by type name ([`Coercer::resolve`]). The built-in
//! coercions are lenient in the direction config files need: `"23"` becomes
//! `23` for an `Integer`, `"true"` becomes `true` for a `Boolean`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{FieldError, SchemaError};
use crate::types::{TypeTag, kind_of};

type CoerceFn = dyn Fn(&Value) -> Result<Value, FieldError> + Send + Sync;

/// A validating conversion applied by an attribute writer or to collection keys.
#[derive(Clone)]
pub struct Coercer {
    type_name: Option<String>,
    f: Arc<CoerceFn>,
}

impl Coercer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        Self {
            type_name: None,
            f: Arc::new(f),
        }
    }

    /// Resolve a built-in coercion from its type name (`"Integer"`, `"bool"`, ...).
    pub fn resolve(type_name: &str) -> Result<Self, SchemaError> {
        type_name.parse::<TypeTag>().map(Coercer::from)
    }

    /// Attach the type name reported in generated documentation.
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn call(&self, raw: &Value) -> Result<Value, FieldError> {
        (self.f)(raw)
    }
}

impl From<TypeTag> for Coercer {
    fn from(tag: TypeTag) -> Self {
        let f: fn(&Value) -> Result<Value, FieldError> = match tag {
            TypeTag::Integer => integer,
            TypeTag::Float => float,
            TypeTag::String => string,
            TypeTag::Boolean => boolean,
            TypeTag::Array => array,
        };
        Coercer::new(f).named(tag.name())
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercer")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn rejected(raw: &Value, tag: TypeTag) -> FieldError {
    match raw {
        Value::String(s) => FieldError::invalid(format!("invalid value for {tag}: {s:?}")),
        other => FieldError::invalid(format!("can't convert {} into {tag}", kind_of(other))),
    }
}

/// Integers, integral floats, and strings that parse as an integer.
pub fn integer(raw: &Value) -> Result<Value, FieldError> {
    match raw {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Ok(raw.clone());
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(Value::from(f as i64))
                }
                _ => Err(rejected(raw, TypeTag::Integer)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| rejected(raw, TypeTag::Integer)),
        _ => Err(rejected(raw, TypeTag::Integer)),
    }
}

/// Numbers and strings that parse as a finite float.
pub fn float(raw: &Value) -> Result<Value, FieldError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| rejected(raw, TypeTag::Float))
}

/// Strings, plus numbers and booleans rendered as text.
pub fn string(raw: &Value) -> Result<Value, FieldError> {
    match raw {
        Value::String(_) => Ok(raw.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(rejected(raw, TypeTag::String)),
    }
}

/// Booleans, and `"true"` / `"false"` in any case.
pub fn boolean(raw: &Value) -> Result<Value, FieldError> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
        _ => Err(rejected(raw, TypeTag::Boolean)),
    }
}

pub fn array(raw: &Value) -> Result<Value, FieldError> {
    match raw {
        Value::Array(_) => Ok(raw.clone()),
        _ => Err(rejected(raw, TypeTag::Array)),
    }
}
