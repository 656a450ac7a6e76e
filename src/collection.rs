//! Lazily-populated collections of configurable entries.
//!
//! A [`ConfigDict`] is keyed by (optionally coerced) keys; a [`ConfigList`]
//! by non-negative index. Entries are created on first access through
//! [`ConfigDict::entry`] / [`ConfigList::entry`] and are never removed.
//! Enumeration only ever sees entries that already exist.
//!
//! Entries are [`ConfigStruct`]s by default. Any other [`Configurable`] type
//! can be used through `with_factory`.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::coerce::Coercer;
use crate::config_struct::ConfigStruct;
use crate::error::FieldError;
use crate::report::ErrorMapping;
use crate::schema::Schema;
use crate::target::{Configurable, Target};
use crate::types::{Key, kind_of};

/// How far past the last materialized index a list entry may be created.
pub const MAX_INDEX_GAP: usize = 1024;

type Factory<E> = Arc<dyn Fn() -> E + Send + Sync>;

fn not_a_mapping(value: &Value) -> FieldError {
    FieldError::invalid(format!(
        "expected a mapping for a collection entry, got {}",
        kind_of(value)
    ))
}

/// A keyed collection of entries, in insertion order.
pub struct ConfigDict<E = ConfigStruct> {
    make: Factory<E>,
    key: Option<Coercer>,
    entries: Vec<(Key, E)>,
}

impl ConfigDict<ConfigStruct> {
    pub fn new(entry: Arc<Schema>, key: Option<Coercer>) -> Self {
        Self::with_factory(move || entry.instantiate(), key)
    }
}

impl<E: Configurable> ConfigDict<E> {
    /// A dictionary whose entries are created by `make`.
    pub fn with_factory(make: impl Fn() -> E + Send + Sync + 'static, key: Option<Coercer>) -> Self {
        Self {
            make: Arc::new(make),
            key,
            entries: Vec::new(),
        }
    }

    /// Apply the key coercer, if any.
    fn coerce_key(&self, key: Key) -> Result<Key, FieldError> {
        match &self.key {
            Some(coercer) => Key::from_value(coercer.call(&key.to_value())?),
            None => Ok(key),
        }
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }

    /// The entry at `key`, created at its defaults if it does not exist yet.
    ///
    /// Fails with [`FieldError::InvalidValue`] if the key coercer rejects
    /// `key`; nothing is created in that case.
    pub fn entry(&mut self, key: impl Into<Key>) -> Result<&mut E, FieldError> {
        let key = self.coerce_key(key.into())?;
        let index = match self.position(&key) {
            Some(index) => index,
            None => {
                trace!(key = %key, "materializing dictionary entry");
                self.entries.push((key, (self.make)()));
                self.entries.len() - 1
            }
        };
        Ok(&mut self.entries[index].1)
    }

    /// The entry at `key` if it has been materialized.
    pub fn get(&self, key: impl Into<Key>) -> Option<&E> {
        let key = self.coerce_key(key.into()).ok()?;
        self.position(&key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut E> {
        let key = self.coerce_key(key.into()).ok()?;
        self.position(&key).map(|i| &mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &E)> {
        self.entries.iter().map(|(key, entry)| (key, entry))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut E)> {
        self.entries.iter_mut().map(|(key, entry)| (&*key, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config_errors(&self) -> ErrorMapping {
        let mut errors = ErrorMapping::new();
        for (key, entry) in &self.entries {
            errors.merge_prefixed(&key.entry_path(), entry.config_errors());
        }
        errors
    }

    /// Entries without a plain-data form are left out.
    pub fn to_plain_data(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .filter_map(|(key, entry)| Some((key.to_string(), entry.to_plain_data()?)))
            .collect();
        Value::Object(map)
    }
}

impl<E: fmt::Debug> fmt::Debug for ConfigDict<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDict")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<E: Configurable> Target for ConfigDict<E> {
    /// Rendered with the coerced key, so the path matches the one
    /// `config_errors()` reports for the same entry.
    fn path(&self, key: &Key) -> String {
        self.coerce_key(key.clone())
            .unwrap_or_else(|_| key.clone())
            .entry_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        Ok(ConfigDict::get(self, key.clone())
            .and_then(Configurable::to_plain_data)
            .unwrap_or(Value::Null))
    }

    fn set(&mut self, _key: &Key, value: Value) -> Result<(), FieldError> {
        Err(not_a_mapping(&value))
    }

    fn can_set(&self, _key: &Key) -> bool {
        false
    }

    fn has_nested(&self, _key: &Key) -> bool {
        true
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        let entry: &mut dyn Target = self.entry(key.clone())?;
        Ok(Some(entry))
    }
}

impl<E: Configurable> Configurable for ConfigDict<E> {
    fn config_errors(&self) -> ErrorMapping {
        ConfigDict::config_errors(self)
    }

    fn to_plain_data(&self) -> Option<Value> {
        Some(ConfigDict::to_plain_data(self))
    }
}

/// An indexed collection of entries.
///
/// Only indices that were accessed hold an entry. Creating an entry more
/// than [`MAX_INDEX_GAP`] places past the current end is rejected.
pub struct ConfigList<E = ConfigStruct> {
    make: Factory<E>,
    slots: Vec<Option<E>>,
}

impl ConfigList<ConfigStruct> {
    pub fn new(entry: Arc<Schema>) -> Self {
        Self::with_factory(move || entry.instantiate())
    }
}

impl<E: Configurable> ConfigList<E> {
    /// A list whose entries are created by `make`.
    pub fn with_factory(make: impl Fn() -> E + Send + Sync + 'static) -> Self {
        Self {
            make: Arc::new(make),
            slots: Vec::new(),
        }
    }

    /// The entry at `index`, created at its defaults if it does not exist yet.
    /// No other index is materialized.
    pub fn entry(&mut self, index: usize) -> Result<&mut E, FieldError> {
        let end = self.slots.len();
        if index >= end {
            if index - end > MAX_INDEX_GAP {
                return Err(FieldError::invalid(format!(
                    "index {index} is too far past the end of the list (length {end})"
                )));
            }
            self.slots.resize_with(index + 1, || None);
        }
        let make = &self.make;
        Ok(self.slots[index].get_or_insert_with(|| {
            trace!(index, "materializing list entry");
            make()
        }))
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Materialized entries with their indices, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &E)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((index, slot.as_ref()?)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut E)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| Some((index, slot.as_mut()?)))
    }

    /// Number of materialized entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn config_errors(&self) -> ErrorMapping {
        let mut errors = ErrorMapping::new();
        for (index, entry) in self.iter() {
            errors.merge_prefixed(&format!("[{index}]"), entry.config_errors());
        }
        errors
    }

    /// Indices that were never accessed come out as null.
    pub fn to_plain_data(&self) -> Value {
        Value::Array(
            self.slots
                .iter()
                .map(|slot| {
                    slot.as_ref()
                        .and_then(Configurable::to_plain_data)
                        .unwrap_or(Value::Null)
                })
                .collect(),
        )
    }
}

impl<E: fmt::Debug> fmt::Debug for ConfigList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigList")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl<E: Configurable> Target for ConfigList<E> {
    fn path(&self, key: &Key) -> String {
        match key.as_index() {
            Some(index) => format!("[{index}]"),
            None => key.entry_path(),
        }
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        Ok(key
            .as_index()
            .and_then(|index| ConfigList::get(self, index))
            .and_then(Configurable::to_plain_data)
            .unwrap_or(Value::Null))
    }

    fn set(&mut self, _key: &Key, value: Value) -> Result<(), FieldError> {
        Err(not_a_mapping(&value))
    }

    fn can_set(&self, _key: &Key) -> bool {
        false
    }

    fn has_nested(&self, key: &Key) -> bool {
        key.as_index().is_some()
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        let Some(index) = key.as_index() else {
            return Err(FieldError::invalid(format!("'{key}' is not a list index")));
        };
        let entry: &mut dyn Target = self.entry(index)?;
        Ok(Some(entry))
    }
}

impl<E: Configurable> Configurable for ConfigList<E> {
    fn config_errors(&self) -> ErrorMapping {
        ConfigList::config_errors(self)
    }

    fn to_plain_data(&self) -> Option<Value> {
        Some(ConfigList::to_plain_data(self))
    }
}
