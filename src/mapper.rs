//! The recursive attribute mapper.
//!
//! Walks source data against a [`Target`], one key at a time:
//!
//! 1. Sequences are walked with their 0-based index as the key.
//! 2. A nested mapping/sequence is merged into the nested target at that key
//!    when the key has no writer, or when a nested target already exists
//!    there. Errors from the nested pass are re-prefixed with the key's path.
//! 3. Anything else is assigned through [`Target::set`].
//!
//! Failures are recorded at the key's path and mapping moves on to the next
//! key; nothing is raised.

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::FieldError;
use crate::report::{ErrorMapping, MappingError};
use crate::target::Target;
use crate::types::{Key, kind_of};

/// Map `data` onto `target`, returning every error encountered, keyed by path.
pub fn configure_with<T: Target + ?Sized>(data: &Value, target: &mut T) -> ErrorMapping {
    let mut errors = ErrorMapping::new();
    match data {
        Value::Object(entries) => {
            for (key, value) in entries {
                apply(target, Key::Str(key.clone()), value, &mut errors);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                match Key::try_from(index) {
                    Ok(key) => apply(target, key, value, &mut errors),
                    Err(error) => errors.insert(format!("[{index}]"), error),
                }
            }
        }
        other => errors.insert(
            String::new(),
            FieldError::invalid(format!(
                "expected a mapping or sequence, got {}",
                kind_of(other)
            )),
        ),
    }
    errors
}

/// Map `data` onto `target`, failing with every error at once.
pub fn configure<T: Target + ?Sized>(data: &Value, target: &mut T) -> Result<(), MappingError> {
    configure_with(data, target).into_result()
}

fn apply<T: Target + ?Sized>(target: &mut T, key: Key, value: &Value, errors: &mut ErrorMapping) {
    let path = target.path(&key);
    let is_nested = value.is_object() || value.is_array();
    let outcome = if is_nested && (!target.can_set(&key) || target.has_nested(&key)) {
        descend(target, &key, &path, value)
    } else {
        target.set(&key, value.clone()).map(|()| ErrorMapping::new())
    };
    match outcome {
        Ok(nested_errors) => errors.merge_prefixed(&path, nested_errors),
        Err(error) => {
            debug!(path = %path, error = %error, "failed to map attribute");
            errors.insert(path, error);
        }
    }
}

fn descend<T: Target + ?Sized>(
    target: &mut T,
    key: &Key,
    path: &str,
    value: &Value,
) -> Result<ErrorMapping, FieldError> {
    match target.nested_mut(key)? {
        Some(nested) => {
            trace!(path = %path, "mapping into nested target");
            Ok(configure_with(value, nested))
        }
        None => Err(FieldError::AttributeNotFound(key.to_string())),
    }
}
