//! The uniform "settable thing" the mapper writes through.
//!
//! Two families of targets exist:
//!
//! - **Containers** (`serde_json::Map`, `Vec<Value>`, [`ConfigDict`],
//!   [`ConfigList`]) address entries by key and render paths as `["key"]` or
//!   `[index]`.
//! - **Objects** ([`ConfigStruct`] and any [`Accessible`] type) address named
//!   attributes and render paths as `.name`. Only attributes with a writer can
//!   be set directly; nested objects are reached through [`Target::nested_mut`].
//!
//! [`ConfigDict`]: crate::ConfigDict
//! [`ConfigList`]: crate::ConfigList
//! [`ConfigStruct`]: crate::ConfigStruct

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::report::ErrorMapping;
use crate::types::Key;

/// Something configuration can be written onto.
pub trait Target {
    /// Path segment identifying `key` within this target.
    fn path(&self, key: &Key) -> String;

    /// Current value at `key`, as plain data.
    fn get(&self, key: &Key) -> Result<Value, FieldError>;

    /// Assign `value` at `key`.
    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError>;

    /// Whether `key` has a writer.
    fn can_set(&self, key: &Key) -> bool;

    /// Whether `key` currently holds a nested target to merge into.
    fn has_nested(&self, _key: &Key) -> bool {
        false
    }

    /// The nested target at `key`, if there is one.
    fn nested_mut(&mut self, _key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        Ok(None)
    }
}

fn nested_value(value: &mut Value) -> Option<&mut dyn Target> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => Some(items),
        _ => None,
    }
}

impl Target for Map<String, Value> {
    fn path(&self, key: &Key) -> String {
        key.entry_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        Ok(Map::get(self, &key.to_string())
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError> {
        self.insert(key.to_string(), value);
        Ok(())
    }

    fn can_set(&self, _key: &Key) -> bool {
        true
    }

    fn has_nested(&self, key: &Key) -> bool {
        matches!(
            Map::get(self, &key.to_string()),
            Some(Value::Object(_) | Value::Array(_))
        )
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        Ok(Map::get_mut(self, &key.to_string()).and_then(nested_value))
    }
}

impl Target for Vec<Value> {
    fn path(&self, key: &Key) -> String {
        key.entry_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        let index = key
            .as_index()
            .ok_or_else(|| FieldError::AttributeNotFound(key.to_string()))?;
        Ok(self.as_slice().get(index).cloned().unwrap_or(Value::Null))
    }

    /// Replaces an existing element or appends one; indices past the end
    /// are rejected.
    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError> {
        let index = key
            .as_index()
            .ok_or_else(|| FieldError::AttributeNotFound(key.to_string()))?;
        match index.cmp(&self.len()) {
            Ordering::Less => self[index] = value,
            Ordering::Equal => self.push(value),
            Ordering::Greater => {
                return Err(FieldError::invalid(format!(
                    "index {index} is past the end of a sequence of length {}",
                    self.len()
                )));
            }
        }
        Ok(())
    }

    fn can_set(&self, key: &Key) -> bool {
        key.as_index().is_some()
    }

    fn has_nested(&self, key: &Key) -> bool {
        key.as_index()
            .and_then(|i| self.as_slice().get(i))
            .is_some_and(|v| v.is_object() || v.is_array())
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        Ok(key
            .as_index()
            .and_then(|i| self.as_mut_slice().get_mut(i))
            .and_then(nested_value))
    }
}

/// A bare `Value` behaves like the container it holds.
impl Target for Value {
    fn path(&self, key: &Key) -> String {
        key.entry_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        match self {
            Value::Object(map) => Target::get(map, key),
            Value::Array(items) => Target::get(items, key),
            _ => Err(FieldError::AttributeNotFound(key.to_string())),
        }
    }

    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError> {
        match self {
            Value::Object(map) => Target::set(map, key, value),
            Value::Array(items) => Target::set(items, key, value),
            _ => Err(FieldError::AttributeNotFound(key.to_string())),
        }
    }

    fn can_set(&self, key: &Key) -> bool {
        match self {
            Value::Object(map) => map.can_set(key),
            Value::Array(items) => items.can_set(key),
            _ => false,
        }
    }

    fn has_nested(&self, key: &Key) -> bool {
        match self {
            Value::Object(map) => map.has_nested(key),
            Value::Array(items) => items.has_nested(key),
            _ => false,
        }
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        match self {
            Value::Object(map) => map.nested_mut(key),
            Value::Array(items) => items.nested_mut(key),
            _ => Ok(None),
        }
    }
}

/// Reads an attribute as plain data.
pub type Reader<T> = fn(&T) -> Value;
/// Validates and stores an attribute.
pub type Writer<T> = fn(&mut T, Value) -> Result<(), FieldError>;
/// Borrows a nested object to configure in place.
pub type Nested<T> = fn(&mut T) -> &mut dyn Target;

struct Accessor<T> {
    name: &'static str,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    nested: Option<Nested<T>>,
}

/// Explicit table of named readers, writers and nested objects for a type.
///
/// Registering a reader and a writer under the same name combines them into
/// one read/write attribute.
pub struct Accessors<T> {
    fields: Vec<Accessor<T>>,
}

impl<T> Default for Accessors<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> Accessors<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(mut self, name: &'static str, reader: Reader<T>) -> Self {
        self.field(name).reader = Some(reader);
        self
    }

    pub fn writer(mut self, name: &'static str, writer: Writer<T>) -> Self {
        self.field(name).writer = Some(writer);
        self
    }

    pub fn accessor(self, name: &'static str, reader: Reader<T>, writer: Writer<T>) -> Self {
        self.reader(name, reader).writer(name, writer)
    }

    /// A read-only attribute holding a nested object that is configured in place.
    pub fn nested(mut self, name: &'static str, reader: Reader<T>, nested: Nested<T>) -> Self {
        let field = self.field(name);
        field.reader = Some(reader);
        field.nested = Some(nested);
        self
    }

    fn field(&mut self, name: &'static str) -> &mut Accessor<T> {
        let index = match self.fields.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(Accessor {
                    name,
                    reader: None,
                    writer: None,
                    nested: None,
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    fn find(&self, key: &Key) -> Option<&Accessor<T>> {
        let Key::Str(name) = key else {
            return None;
        };
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A type that exposes named accessors, making it an object [`Target`].
///
/// The table is built once per type and handed out as a `'static` borrow:
///
/// ```
/// use std::sync::LazyLock;
/// use config_mapper::{Accessible, Accessors, FieldError, Value};
///
/// #[derive(Default)]
/// struct Position {
///     x: Option<i64>,
/// }
///
/// impl Accessible for Position {
///     fn accessors() -> &'static Accessors<Self> {
///         static ACCESSORS: LazyLock<Accessors<Position>> = LazyLock::new(|| {
///             Accessors::<Position>::new().accessor(
///                 "x",
///                 |p| Value::from(p.x),
///                 |p, v| {
///                     p.x = Some(v.as_i64().ok_or_else(|| {
///                         FieldError::InvalidValue(format!("{v} is not an integer"))
///                     })?);
///                     Ok(())
///                 },
///             )
///         });
///         &ACCESSORS
///     }
/// }
/// ```
pub trait Accessible: Sized + 'static {
    fn accessors() -> &'static Accessors<Self>;
}

impl<T: Accessible> Target for T {
    fn path(&self, key: &Key) -> String {
        key.attribute_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        match T::accessors().find(key).and_then(|f| f.reader) {
            Some(reader) => Ok(reader(self)),
            None => Err(FieldError::AttributeNotFound(key.to_string())),
        }
    }

    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError> {
        match T::accessors().find(key).and_then(|f| f.writer) {
            Some(writer) => writer(self, value),
            None => Err(FieldError::AttributeNotFound(key.to_string())),
        }
    }

    fn can_set(&self, key: &Key) -> bool {
        T::accessors()
            .find(key)
            .is_some_and(|f| f.writer.is_some())
    }

    fn has_nested(&self, key: &Key) -> bool {
        T::accessors()
            .find(key)
            .is_some_and(|f| f.nested.is_some())
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        match T::accessors().find(key).and_then(|f| f.nested) {
            Some(borrow) => Ok(Some(borrow(self))),
            None => Ok(None),
        }
    }
}

/// A [`Target`] that can live inside a schema instance, as a component or as
/// a collection entry.
///
/// Both methods are optional. A type without required values reports no
/// errors; a type without a plain-data form is left out of
/// `to_plain_data()` output.
pub trait Configurable: Target + fmt::Debug + Send + Sync + 'static {
    fn config_errors(&self) -> ErrorMapping {
        ErrorMapping::new()
    }

    fn to_plain_data(&self) -> Option<Value> {
        None
    }
}

/// Type-erased [`Configurable`] stored in a schema instance.
pub(crate) trait Erased: Configurable {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_target_mut(&mut self) -> &mut dyn Target;
}

impl<T: Configurable> Erased for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_target_mut(&mut self) -> &mut dyn Target {
        self
    }
}
