//! Declarative schemas: the configurable surface of a type.
//!
//! A [`Schema`] is an ordered list of [`Declaration`]s, built once through a
//! [`SchemaBuilder`] and immutable afterwards. Every [`ConfigStruct`] created
//! from it shares the declarations and owns its own values.
//!
//! ```
//! use config_mapper::{Attribute, Collection, Component, Schema, TypeTag};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .attribute("name")
//!     .attribute(Attribute::new("port").of(TypeTag::Integer).default(5000))
//!     .component(Component::new("position").with(|s| s.attribute("x").attribute("y")))
//!     .collection(Collection::dict("services").with(|s| s.attribute("image")))
//!     .build()?;
//!
//! let mut config = schema.instantiate();
//! let errors = config.configure_with(&json!({"services": {"app": {"image": "web"}}}));
//! assert!(errors.contains(".name"));
//! assert!(errors.contains(".position.x"));
//! assert_eq!(config.value("port"), Some(&json!(5000)));
//! # Ok::<(), config_mapper::SchemaError>(())
//! ```
//!
//! # Other value types
//!
//! A component or collection can hold values of any [`Configurable`] type
//! instead of schema instances, by declaring a factory:
//!
//! ```
//! use std::sync::LazyLock;
//! use config_mapper::{Accessible, Accessors, Component, Configurable, Schema, Value};
//! use serde_json::json;
//!
//! #[derive(Debug, Default)]
//! struct Shirt {
//!     colour: Value,
//! }
//!
//! impl Accessible for Shirt {
//!     fn accessors() -> &'static Accessors<Self> {
//!         static ACCESSORS: LazyLock<Accessors<Shirt>> = LazyLock::new(|| {
//!             Accessors::<Shirt>::new().accessor(
//!                 "colour",
//!                 |s| s.colour.clone(),
//!                 |s, v| {
//!                     s.colour = v;
//!                     Ok(())
//!                 },
//!             )
//!         });
//!         &ACCESSORS
//!     }
//! }
//!
//! impl Configurable for Shirt {}
//!
//! let config = Schema::builder()
//!     .component(Component::new("shirt").factory(Shirt::default))
//!     .load(&json!({"shirt": {"colour": "red"}}))?;
//! assert_eq!(config.component_as::<Shirt>("shirt").unwrap().colour, json!("red"));
//! # Ok::<(), config_mapper::Error>(())
//! ```
//!
//! # Inheritance
//!
//! [`SchemaBuilder::extends`] starts from a parent's declarations. Declaring
//! a name the parent already has replaces that declaration in place, for the
//! new schema only. The flattened list is computed once in
//! [`build`](SchemaBuilder::build).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::coerce::Coercer;
use crate::collection::{ConfigDict, ConfigList};
use crate::config_struct::ConfigStruct;
use crate::docs::FieldDoc;
use crate::error::{Error, FieldError, SchemaError};
use crate::target::{Configurable, Erased};
use crate::types::{Key, TypeTag};

/// A built schema. Shared behind an `Arc` by every instance.
#[derive(Debug, Default)]
pub struct Schema {
    declarations: Vec<Declaration>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The generic base: no declarations. Used for components declared
    /// without a type.
    pub fn empty() -> Arc<Schema> {
        Arc::new(Schema::default())
    }

    pub(crate) fn from_declarations(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.name() == name)
    }

    /// A fresh instance with every declaration at its default.
    pub fn instantiate(self: &Arc<Self>) -> ConfigStruct {
        ConfigStruct::new(self)
    }

    /// Instantiate and configure from `data`, failing with
    /// [`Error::Mapping`] if anything is wrong.
    pub fn load(self: &Arc<Self>, data: &Value) -> Result<ConfigStruct, Error> {
        let mut config = self.instantiate();
        config.configure_with(data).into_result()?;
        Ok(config)
    }

    /// Documentation for every reachable attribute, keyed by path.
    ///
    /// Component attributes are prefixed with the component's path; collection
    /// entries use `[X]` (dictionaries) or `[N]` (lists) in place of a key.
    pub fn documentation(&self) -> BTreeMap<String, FieldDoc> {
        let mut docs = BTreeMap::new();
        for declaration in &self.declarations {
            let path = Key::from(declaration.name()).attribute_path();
            match declaration {
                Declaration::Attribute(attribute) => {
                    docs.insert(path, attribute.doc());
                }
                Declaration::Component(component) => {
                    if let Some(description) = &component.description {
                        docs.insert(path.clone(), FieldDoc::described(description));
                    }
                    if let Some(schema) = component.schema() {
                        for (nested, doc) in schema.documentation() {
                            docs.insert(format!("{path}{nested}"), doc);
                        }
                    }
                }
                Declaration::Collection(collection) => {
                    if let Some(description) = &collection.description {
                        docs.insert(path.clone(), FieldDoc::described(description));
                    }
                    let placeholder = match collection.kind {
                        CollectionKind::Dict => "[X]",
                        CollectionKind::List => "[N]",
                    };
                    if let Some(entry) = collection.entry() {
                        for (nested, doc) in entry.documentation() {
                            docs.insert(format!("{path}{placeholder}{nested}"), doc);
                        }
                    }
                }
            }
        }
        docs
    }
}

/// One entry of a schema's configurable surface.
#[derive(Debug, Clone)]
pub enum Declaration {
    Attribute(AttributeDecl),
    Component(ComponentDecl),
    Collection(CollectionDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Attribute(a) => &a.name,
            Declaration::Component(c) => &c.name,
            Declaration::Collection(c) => &c.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Declaration::Attribute(a) => a.description.as_deref(),
            Declaration::Component(c) => c.description.as_deref(),
            Declaration::Collection(c) => c.description.as_deref(),
        }
    }
}

/// A scalar (or plain-data) attribute with a validating writer.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    name: String,
    default: Option<Value>,
    validator: Option<Coercer>,
    description: Option<String>,
}

impl AttributeDecl {
    pub(crate) fn new(
        name: String,
        default: Option<Value>,
        validator: Option<Coercer>,
        description: Option<String>,
    ) -> Self {
        Self {
            name,
            default,
            validator,
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required attributes are those declared without any default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn validator(&self) -> Option<&Coercer> {
        self.validator.as_ref()
    }

    /// Writer semantics: null into a required attribute fails immediately;
    /// null into an optional one is stored without validation; anything
    /// else goes through the validator.
    pub fn coerce(&self, value: Value) -> Result<Value, FieldError> {
        if value.is_null() {
            return if self.is_required() {
                Err(FieldError::NoValueProvided)
            } else {
                Ok(Value::Null)
            };
        }
        match &self.validator {
            Some(validator) => validator.call(&value),
            None => Ok(value),
        }
    }

    fn doc(&self) -> FieldDoc {
        FieldDoc {
            description: self.description.clone(),
            default: self.default.clone(),
            type_name: self
                .validator
                .as_ref()
                .and_then(|v| v.type_name())
                .map(str::to_string),
        }
    }
}

/// Creates a value that is not a schema instance. `A` is what the
/// declaration passes in: nothing for components, the key coercer for
/// collections.
pub(crate) struct Factory<A> {
    type_name: &'static str,
    make: Arc<dyn Fn(A) -> Box<dyn Erased> + Send + Sync>,
}

impl<A> Factory<A> {
    pub(crate) fn make(&self, arg: A) -> Box<dyn Erased> {
        (self.make)(arg)
    }
}

impl<A> Clone for Factory<A> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            make: Arc::clone(&self.make),
        }
    }
}

impl<A> fmt::Debug for Factory<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Factory").field(&self.type_name).finish()
    }
}

/// What a component, or each entry of a collection, is made from.
#[derive(Debug, Clone)]
pub(crate) enum Source<A> {
    Schema(Arc<Schema>),
    Factory(Factory<A>),
}

impl<A> Source<A> {
    fn schema(&self) -> Option<&Arc<Schema>> {
        match self {
            Source::Schema(schema) => Some(schema),
            Source::Factory(_) => None,
        }
    }

    fn type_name(&self) -> Option<&'static str> {
        match self {
            Source::Schema(_) => None,
            Source::Factory(factory) => Some(factory.type_name),
        }
    }
}

/// A nested sub-object, created fresh for every instance.
#[derive(Debug, Clone)]
pub struct ComponentDecl {
    name: String,
    source: Source<()>,
    description: Option<String>,
}

impl ComponentDecl {
    pub(crate) fn new(name: String, schema: Arc<Schema>, description: Option<String>) -> Self {
        Self {
            name,
            source: Source::Schema(schema),
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component's schema; `None` if it is built by a factory.
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.source.schema()
    }

    /// Rust type name of a factory-built component.
    pub fn type_name(&self) -> Option<&'static str> {
        self.source.type_name()
    }

    pub(crate) fn source(&self) -> &Source<()> {
        &self.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Dict,
    List,
}

/// A lazily-populated dictionary or list of entries.
#[derive(Debug, Clone)]
pub struct CollectionDecl {
    name: String,
    kind: CollectionKind,
    source: Source<Option<Coercer>>,
    key: Option<Coercer>,
    description: Option<String>,
}

impl CollectionDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// The entry schema; `None` if entries are built by a factory.
    pub fn entry(&self) -> Option<&Arc<Schema>> {
        self.source.schema()
    }

    /// Rust type name of the collection built by a factory.
    pub fn type_name(&self) -> Option<&'static str> {
        self.source.type_name()
    }

    pub(crate) fn source(&self) -> &Source<Option<Coercer>> {
        &self.source
    }

    /// Key coercer, applied to dictionary keys on access.
    pub fn key(&self) -> Option<&Coercer> {
        self.key.as_ref()
    }
}

#[derive(Debug, Clone)]
enum Validator {
    Coercer(Coercer),
    Named(String),
}

impl Validator {
    fn resolve(self) -> Result<Coercer, SchemaError> {
        match self {
            Validator::Coercer(coercer) => Ok(coercer),
            Validator::Named(name) => Coercer::resolve(&name),
        }
    }
}

/// Declares an attribute. Without [`default`](Self::default) it is required.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    default: Option<Value>,
    validator: Option<Validator>,
    description: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            validator: None,
            description: None,
        }
    }

    /// Coerce assigned values with a built-in type or a custom [`Coercer`].
    pub fn of(mut self, validator: impl Into<Coercer>) -> Self {
        self.validator = Some(Validator::Coercer(validator.into()));
        self
    }

    /// Coerce with a built-in type looked up by name when the schema is built.
    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.validator = Some(Validator::Named(type_name.into()));
        self
    }

    /// Make the attribute optional, starting at `value`. `Value::Null` is allowed.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn resolve(self) -> Result<Declaration, SchemaError> {
        let validator = self.validator.map(Validator::resolve).transpose()?;
        Ok(Declaration::Attribute(AttributeDecl::new(
            self.name,
            self.default,
            validator,
            self.description,
        )))
    }
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Attribute::new(name)
    }
}

/// Where a component or collection entry comes from, as declared.
#[derive(Debug, Clone)]
enum EntrySource<A> {
    Schema(Arc<Schema>),
    Inline(Box<SchemaBuilder>),
    Factory(Factory<A>),
}

impl<A> EntrySource<A> {
    /// Inline declarations extend the schema chosen so far. A factory is
    /// replaced by the generic base.
    fn inline(self, block: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        let base = match self {
            EntrySource::Schema(schema) => Schema::builder().extends(&schema),
            EntrySource::Inline(builder) => *builder,
            EntrySource::Factory(_) => Schema::builder(),
        };
        EntrySource::Inline(Box::new(block(base)))
    }

    fn resolve(self) -> Result<Source<A>, SchemaError> {
        match self {
            EntrySource::Schema(schema) => Ok(Source::Schema(schema)),
            EntrySource::Inline(builder) => Ok(Source::Schema(builder.build()?)),
            EntrySource::Factory(factory) => Ok(Source::Factory(factory)),
        }
    }
}

/// Declares a nested component.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    source: EntrySource<()>,
    description: Option<String>,
}

impl Component {
    /// A component of the generic base type, until [`schema`](Self::schema)
    /// or [`with`](Self::with) says otherwise.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Schema(Schema::empty()),
            description: None,
        }
    }

    pub fn schema(mut self, schema: &Arc<Schema>) -> Self {
        self.source = EntrySource::Schema(Arc::clone(schema));
        self
    }

    /// Define the component's type inline, extending the type chosen so far.
    pub fn with(mut self, block: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        self.source = self.source.inline(block);
        self
    }

    /// Build the component with `make` instead of from a schema.
    pub fn factory<T: Configurable>(mut self, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.source = EntrySource::Factory(Factory {
            type_name: std::any::type_name::<T>(),
            make: Arc::new(move |()| -> Box<dyn Erased> { Box::new(make()) }),
        });
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn resolve(self) -> Result<Declaration, SchemaError> {
        Ok(Declaration::Component(ComponentDecl {
            name: self.name,
            source: self.source.resolve()?,
            description: self.description,
        }))
    }
}

impl From<&str> for Component {
    fn from(name: &str) -> Self {
        Component::new(name)
    }
}

/// Declares a keyed ([`dict`](Self::dict)) or indexed ([`list`](Self::list))
/// collection of components.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    kind: CollectionKind,
    source: EntrySource<Option<Coercer>>,
    key: Option<Validator>,
    description: Option<String>,
}

impl Collection {
    pub fn dict(name: impl Into<String>) -> Self {
        Self::new(name.into(), CollectionKind::Dict)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name.into(), CollectionKind::List)
    }

    fn new(name: String, kind: CollectionKind) -> Self {
        Self {
            name,
            kind,
            source: EntrySource::Schema(Schema::empty()),
            key: None,
            description: None,
        }
    }

    pub fn entry(mut self, schema: &Arc<Schema>) -> Self {
        self.source = EntrySource::Schema(Arc::clone(schema));
        self
    }

    /// Define the entry type inline, extending the type chosen so far.
    pub fn with(mut self, block: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        self.source = self.source.inline(block);
        self
    }

    /// Build entries with `make` instead of from a schema.
    pub fn factory<T: Configurable>(mut self, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let make = Arc::new(make);
        let build: Arc<dyn Fn(Option<Coercer>) -> Box<dyn Erased> + Send + Sync> = match self.kind {
            CollectionKind::Dict => Arc::new(move |key: Option<Coercer>| -> Box<dyn Erased> {
                let make = Arc::clone(&make);
                Box::new(ConfigDict::with_factory(move || make(), key))
            }),
            CollectionKind::List => Arc::new(move |_: Option<Coercer>| -> Box<dyn Erased> {
                let make = Arc::clone(&make);
                Box::new(ConfigList::with_factory(move || make()))
            }),
        };
        self.source = EntrySource::Factory(Factory {
            type_name: std::any::type_name::<T>(),
            make: build,
        });
        self
    }

    /// Coerce and validate dictionary keys. Ignored for lists.
    pub fn key(mut self, coercer: impl Into<Coercer>) -> Self {
        self.key = Some(Validator::Coercer(coercer.into()));
        self
    }

    pub fn key_type(mut self, type_name: impl Into<String>) -> Self {
        self.key = Some(Validator::Named(type_name.into()));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn resolve(self) -> Result<Declaration, SchemaError> {
        Ok(Declaration::Collection(CollectionDecl {
            name: self.name,
            kind: self.kind,
            source: self.source.resolve()?,
            key: self.key.map(Validator::resolve).transpose()?,
            description: self.description,
        }))
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Attribute(Attribute),
    Component(Component),
    Collection(Collection),
}

impl Pending {
    fn name(&self) -> &str {
        match self {
            Pending::Attribute(a) => &a.name,
            Pending::Component(c) => &c.name,
            Pending::Collection(c) => &c.name,
        }
    }

    fn resolve(self) -> Result<Declaration, SchemaError> {
        match self {
            Pending::Attribute(a) => a.resolve(),
            Pending::Component(c) => c.resolve(),
            Pending::Collection(c) => c.resolve(),
        }
    }
}

/// Collects declarations; [`build`](Self::build) validates and freezes them.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    parent: Option<Arc<Schema>>,
    pending: Vec<Pending>,
}

impl SchemaBuilder {
    /// Inherit every declaration of `parent`.
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn attribute(mut self, attribute: impl Into<Attribute>) -> Self {
        self.pending.push(Pending::Attribute(attribute.into()));
        self
    }

    /// Shorthand for an attribute coerced by a built-in type.
    pub fn typed(self, name: &str, tag: TypeTag) -> Self {
        self.attribute(Attribute::new(name).of(tag))
    }

    pub fn component(mut self, component: impl Into<Component>) -> Self {
        self.pending.push(Pending::Component(component.into()));
        self
    }

    pub fn collection(mut self, collection: Collection) -> Self {
        self.pending.push(Pending::Collection(collection));
        self
    }

    /// Resolve validators and nested types, and flatten inherited declarations.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut declarations = self
            .parent
            .map(|parent| parent.declarations.clone())
            .unwrap_or_default();
        for pending in self.pending {
            if pending.name().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            let declaration = pending.resolve()?;
            match declarations
                .iter_mut()
                .find(|existing| existing.name() == declaration.name())
            {
                Some(existing) => *existing = declaration,
                None => declarations.push(declaration),
            }
        }
        debug!(declarations = declarations.len(), "schema built");
        Ok(Arc::new(Schema::from_declarations(declarations)))
    }

    /// Build the schema and load `data` into a fresh instance of it.
    ///
    /// Fails with [`Error::Schema`] for an invalid declaration and with
    /// [`Error::Mapping`] for invalid data.
    pub fn load(self, data: &Value) -> Result<ConfigStruct, Error> {
        self.build()?.load(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Shirt, position_schema, server_schema};
    use serde_json::json;

    #[test]
    fn declarations_keep_order() {
        let schema = server_schema();
        let names: Vec<&str> = schema.declarations().iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["name", "port", "perhaps", "position", "services", "words"]
        );
    }

    #[test]
    fn attribute_without_default_is_required() {
        let schema = Schema::builder().attribute("name").build().unwrap();
        let Some(Declaration::Attribute(name)) = schema.declaration("name") else {
            panic!("expected attribute");
        };
        assert!(name.is_required());
        assert_eq!(name.default(), None);
    }

    #[test]
    fn null_default_makes_optional() {
        let schema = Schema::builder()
            .attribute(Attribute::new("perhaps").default(Value::Null))
            .build()
            .unwrap();
        let Some(Declaration::Attribute(perhaps)) = schema.declaration("perhaps") else {
            panic!("expected attribute");
        };
        assert!(!perhaps.is_required());
    }

    #[test]
    fn coerce_rejects_null_for_required() {
        let decl = AttributeDecl::new("name".into(), None, None, None);
        assert_eq!(decl.coerce(Value::Null), Err(FieldError::NoValueProvided));
    }

    #[test]
    fn coerce_bypasses_validator_for_optional_null() {
        let decl = AttributeDecl::new(
            "port".into(),
            Some(Value::Null),
            Some(TypeTag::Integer.into()),
            None,
        );
        assert_eq!(decl.coerce(Value::Null), Ok(Value::Null));
        assert_eq!(decl.coerce(json!("8")), Ok(json!(8)));
    }

    #[test]
    fn unknown_type_name_fails_build() {
        let result = Schema::builder()
            .attribute(Attribute::new("count").of_type("Integr"))
            .build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::UnknownType("Integr".into())
        );
    }

    #[test]
    fn unknown_type_in_nested_component_fails_build() {
        let result = Schema::builder()
            .component(Component::new("inner").with(|s| s.attribute(Attribute::new("n").of_type("?"))))
            .build();
        assert!(matches!(result, Err(SchemaError::UnknownType(_))));
    }

    #[test]
    fn unknown_key_type_fails_build() {
        let result = Schema::builder()
            .collection(Collection::dict("ports").key_type("Port"))
            .build();
        assert!(matches!(result, Err(SchemaError::UnknownType(_))));
    }

    #[test]
    fn empty_name_fails_build() {
        let result = Schema::builder().attribute("").build();
        assert_eq!(result.unwrap_err(), SchemaError::EmptyName);
    }

    #[test]
    fn extends_inherits_and_overrides_in_place() {
        let parent = Schema::builder()
            .attribute("name")
            .attribute(Attribute::new("port").default(5000))
            .build()
            .unwrap();
        let child = Schema::builder()
            .extends(&parent)
            .attribute(Attribute::new("port").default(8080))
            .attribute("description")
            .build()
            .unwrap();

        let names: Vec<&str> = child.declarations().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["name", "port", "description"]);

        let Some(Declaration::Attribute(port)) = child.declaration("port") else {
            panic!("expected attribute");
        };
        assert_eq!(port.default(), Some(&json!(8080)));

        // the parent is untouched
        let Some(Declaration::Attribute(port)) = parent.declaration("port") else {
            panic!("expected attribute");
        };
        assert_eq!(port.default(), Some(&json!(5000)));
        assert!(parent.declaration("description").is_none());
    }

    #[test]
    fn inline_component_extends_given_schema() {
        let schema = Schema::builder()
            .component(
                Component::new("position")
                    .schema(&position_schema())
                    .with(|s| s.attribute("z")),
            )
            .build()
            .unwrap();
        let Some(Declaration::Component(position)) = schema.declaration("position") else {
            panic!("expected component");
        };
        let names: Vec<&str> = position
            .schema()
            .unwrap()
            .declarations()
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn documentation_has_every_attribute() {
        let docs = Schema::builder()
            .attribute("flavour")
            .typed("scoops", TypeTag::Integer)
            .build()
            .unwrap()
            .documentation();
        assert!(docs.contains_key(".flavour"));
        assert!(docs.contains_key(".scoops"));
        assert_eq!(docs[".flavour"].type_name, None);
        assert_eq!(docs[".scoops"].type_name.as_deref(), Some("Integer"));
    }

    #[test]
    fn documentation_prefixes_nested_paths() {
        let docs = server_schema().documentation();
        let paths: Vec<&str> = docs.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                ".name",
                ".perhaps",
                ".port",
                ".position",
                ".position.x",
                ".position.y",
                ".services",
                ".services[X].image",
                ".services[X].port",
                ".words",
            ]
        );
        assert_eq!(docs[".port"].default, Some(json!(5000)));
        assert_eq!(
            docs[".position"].description.as_deref(),
            Some("Where the server sits.")
        );
    }

    #[test]
    fn documentation_uses_index_placeholder_for_lists() {
        let docs = Schema::builder()
            .collection(Collection::list("steps").with(|s| s.attribute("run")))
            .build()
            .unwrap()
            .documentation();
        assert!(docs.contains_key(".steps[N].run"));
    }

    #[test]
    fn load_raises_aggregate_error() {
        let err = server_schema()
            .load(&json!({"port": "many"}))
            .unwrap_err();
        let Error::Mapping(err) = err else {
            panic!("Expected Mapping error, got: {err:?}");
        };
        let paths: Vec<&str> = err.errors().paths().collect();
        assert!(paths.contains(&".name"));
        assert!(paths.contains(&".port"));
    }

    #[test]
    fn builder_load_reports_invalid_declarations() {
        let result = Schema::builder()
            .attribute(Attribute::new("count").of_type("Integr"))
            .load(&json!({"count": 1}));
        assert!(matches!(
            result,
            Err(Error::Schema(SchemaError::UnknownType(_)))
        ));
    }

    #[test]
    fn builder_load_configures() {
        let config = Schema::builder()
            .typed("count", TypeTag::Integer)
            .load(&json!({"count": "3"}))
            .unwrap();
        assert_eq!(config.value("count"), Some(&json!(3)));
    }

    #[test]
    fn factory_declarations_document_only_their_description() {
        let schema = Schema::builder()
            .component(
                Component::new("shirt")
                    .factory(Shirt::default)
                    .description("What to wear."),
            )
            .collection(Collection::list("spares").factory(Shirt::default))
            .build()
            .unwrap();
        let docs = schema.documentation();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec![".shirt"]);
        let Some(Declaration::Component(shirt)) = schema.declaration("shirt") else {
            panic!("expected component");
        };
        assert!(shirt.schema().is_none());
        assert!(shirt.type_name().unwrap().ends_with("Shirt"));
    }

    #[test]
    fn inline_block_replaces_factory() {
        let schema = Schema::builder()
            .component(
                Component::new("shirt")
                    .factory(Shirt::default)
                    .with(|s| s.attribute("size")),
            )
            .build()
            .unwrap();
        let Some(Declaration::Component(shirt)) = schema.declaration("shirt") else {
            panic!("expected component");
        };
        assert!(shirt.schema().unwrap().declaration("size").is_some());
    }

    #[test]
    fn load_returns_configured_instance() {
        let schema = Schema::builder()
            .typed("port", TypeTag::Integer)
            .build()
            .unwrap();
        let config = schema.load(&json!({"port": "80"})).unwrap();
        assert_eq!(config.value("port"), Some(&json!(80)));
    }
}
