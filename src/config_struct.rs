use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::collection::{ConfigDict, ConfigList};
use crate::error::{Error, FieldError};
use crate::mapper;
use crate::report::ErrorMapping;
use crate::schema::{CollectionKind, Declaration, Schema, Source};
use crate::target::{Configurable, Erased, Target};
use crate::types::Key;

#[derive(Debug)]
enum Slot {
    Value(Value),
    Component(ConfigStruct),
    Dict(ConfigDict),
    List(ConfigList),
    /// A component or collection built by a factory.
    Custom(Box<dyn Erased>),
}

/// An instance of a [`Schema`]: one slot per declaration.
///
/// Attributes are read with [`value`](Self::value) and written with
/// [`set`](Self::set), which applies the declared validator. Components and
/// collections have no writer; they are configured in place.
#[derive(Debug)]
pub struct ConfigStruct {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
}

impl ConfigStruct {
    /// Instantiate every declaration, ancestors' first, at its default.
    ///
    /// Defaults are copied into the instance, so no two instances share
    /// mutable state.
    pub fn new(schema: &Arc<Schema>) -> Self {
        let slots = schema
            .declarations()
            .iter()
            .map(|declaration| match declaration {
                Declaration::Attribute(attribute) => {
                    Slot::Value(attribute.default().cloned().unwrap_or(Value::Null))
                }
                Declaration::Component(component) => match component.source() {
                    Source::Schema(schema) => Slot::Component(ConfigStruct::new(schema)),
                    Source::Factory(factory) => Slot::Custom(factory.make(())),
                },
                Declaration::Collection(collection) => {
                    let key = collection.key().cloned();
                    match (collection.source(), collection.kind()) {
                        (Source::Factory(factory), _) => Slot::Custom(factory.make(key)),
                        (Source::Schema(entry), CollectionKind::Dict) => {
                            Slot::Dict(ConfigDict::new(Arc::clone(entry), key))
                        }
                        (Source::Schema(entry), CollectionKind::List) => {
                            Slot::List(ConfigList::new(Arc::clone(entry)))
                        }
                    }
                }
            })
            .collect();
        Self {
            schema: Arc::clone(schema),
            slots,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.schema.position(name).map(|i| &self.slots[i])
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.schema.position(name).map(|i| &mut self.slots[i])
    }

    /// Current value of an attribute. `None` if `name` is not an attribute.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.slot(name)? {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Assign an attribute through its validator.
    ///
    /// Assigning null to a required attribute fails with
    /// [`FieldError::NoValueProvided`] right away.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FieldError> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| FieldError::AttributeNotFound(name.to_string()))?;
        let Declaration::Attribute(attribute) = &self.schema.declarations()[index] else {
            return Err(FieldError::AttributeNotFound(name.to_string()));
        };
        self.slots[index] = Slot::Value(attribute.coerce(value.into())?);
        Ok(())
    }

    pub fn component(&self, name: &str) -> Option<&ConfigStruct> {
        match self.slot(name)? {
            Slot::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut ConfigStruct> {
        match self.slot_mut(name)? {
            Slot::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn dict(&self, name: &str) -> Option<&ConfigDict> {
        match self.slot(name)? {
            Slot::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn dict_mut(&mut self, name: &str) -> Option<&mut ConfigDict> {
        match self.slot_mut(name)? {
            Slot::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&ConfigList> {
        match self.slot(name)? {
            Slot::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, name: &str) -> Option<&mut ConfigList> {
        match self.slot_mut(name)? {
            Slot::List(list) => Some(list),
            _ => None,
        }
    }

    /// A factory-built component or collection, as its concrete type.
    ///
    /// `None` if `name` is not factory-built or `T` is not its type.
    pub fn component_as<T: 'static>(&self, name: &str) -> Option<&T> {
        match self.slot(name)? {
            Slot::Custom(custom) => custom.as_any().downcast_ref(),
            _ => None,
        }
    }

    pub fn component_as_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        match self.slot_mut(name)? {
            Slot::Custom(custom) => custom.as_any_mut().downcast_mut(),
            _ => None,
        }
    }

    /// Required attributes still null, here and in every component and
    /// materialized collection entry.
    pub fn config_errors(&self) -> ErrorMapping {
        let mut errors = ErrorMapping::new();
        for (declaration, slot) in self.schema.declarations().iter().zip(&self.slots) {
            let path = Key::from(declaration.name()).attribute_path();
            match (declaration, slot) {
                (Declaration::Attribute(attribute), Slot::Value(value)) => {
                    if attribute.is_required() && value.is_null() {
                        errors.insert(path, FieldError::NoValueProvided);
                    }
                }
                (_, Slot::Component(component)) => {
                    errors.merge_prefixed(&path, component.config_errors())
                }
                (_, Slot::Dict(dict)) => errors.merge_prefixed(&path, dict.config_errors()),
                (_, Slot::List(list)) => errors.merge_prefixed(&path, list.config_errors()),
                (_, Slot::Custom(custom)) => errors.merge_prefixed(&path, custom.config_errors()),
                _ => {}
            }
        }
        errors
    }

    /// Map `data` onto this instance, then report still-missing attributes.
    ///
    /// A mapping error at a path takes precedence over a missing-value error
    /// at the same path.
    pub fn configure_with(&mut self, data: &Value) -> ErrorMapping {
        let mapping_errors = mapper::configure_with(data, self);
        let mut errors = self.config_errors();
        errors.extend(mapping_errors);
        errors
    }

    /// Plain data for every declaration, in declaration order.
    ///
    /// Factory-built values without a plain-data form are left out.
    pub fn to_plain_data(&self) -> Value {
        let mut map = Map::new();
        for (declaration, slot) in self.schema.declarations().iter().zip(&self.slots) {
            let value = match slot {
                Slot::Value(value) => value.clone(),
                Slot::Component(component) => component.to_plain_data(),
                Slot::Dict(dict) => dict.to_plain_data(),
                Slot::List(list) => list.to_plain_data(),
                Slot::Custom(custom) => match custom.to_plain_data() {
                    Some(value) => value,
                    None => continue,
                },
            };
            map.insert(declaration.name().to_string(), value);
        }
        Value::Object(map)
    }

    /// Deserialize the current plain data into a typed struct.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(self.to_plain_data()).map_err(Error::Extract)
    }

    /// Current plain value at a path such as `.position.x` or
    /// `.services["app"].port`.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let keys = Key::parse_path(path)?;
        let mut current = self.to_plain_data();
        for key in keys {
            current = match current {
                Value::Object(mut map) => map.remove(&key.to_string())?,
                Value::Array(mut items) => {
                    let index = key.as_index()?;
                    if index >= items.len() {
                        return None;
                    }
                    items.swap_remove(index)
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

impl Target for ConfigStruct {
    fn path(&self, key: &Key) -> String {
        key.attribute_path()
    }

    fn get(&self, key: &Key) -> Result<Value, FieldError> {
        let name = key.to_string();
        match self.slot(&name) {
            Some(Slot::Value(value)) => Ok(value.clone()),
            Some(Slot::Component(component)) => Ok(component.to_plain_data()),
            Some(Slot::Dict(dict)) => Ok(dict.to_plain_data()),
            Some(Slot::List(list)) => Ok(list.to_plain_data()),
            Some(Slot::Custom(custom)) => Ok(custom.to_plain_data().unwrap_or(Value::Null)),
            None => Err(FieldError::AttributeNotFound(name)),
        }
    }

    fn set(&mut self, key: &Key, value: Value) -> Result<(), FieldError> {
        ConfigStruct::set(self, &key.to_string(), value)
    }

    fn can_set(&self, key: &Key) -> bool {
        matches!(self.slot(&key.to_string()), Some(Slot::Value(_)))
    }

    fn has_nested(&self, key: &Key) -> bool {
        matches!(
            self.slot(&key.to_string()),
            Some(Slot::Component(_) | Slot::Dict(_) | Slot::List(_) | Slot::Custom(_))
        )
    }

    fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
        let nested: &mut dyn Target = match self.slot_mut(&key.to_string()) {
            Some(Slot::Component(component)) => component,
            Some(Slot::Dict(dict)) => dict,
            Some(Slot::List(list)) => list,
            Some(Slot::Custom(custom)) => custom.as_target_mut(),
            Some(Slot::Value(_)) | None => return Ok(None),
        };
        Ok(Some(nested))
    }
}

impl Configurable for ConfigStruct {
    fn config_errors(&self) -> ErrorMapping {
        ConfigStruct::config_errors(self)
    }

    fn to_plain_data(&self) -> Option<Value> {
        Some(ConfigStruct::to_plain_data(self))
    }
}
