//! Map loosely-typed configuration data onto declared, strongly-typed
//! structures. Declare a schema, hand it parsed data, and get back either a
//! configured instance or every field that was wrong.
//!
//! ```
//! use config_mapper::{Attribute, Collection, Schema, TypeTag};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .attribute("name")
//!     .attribute(Attribute::new("port").of(TypeTag::Integer).default(5000))
//!     .collection(Collection::dict("services").with(|s| s.typed("port", TypeTag::Integer)))
//!     .build()?;
//!
//! let mut config = schema.instantiate();
//! let errors = config.configure_with(&json!({
//!     "port": "8080",
//!     "services": {"app": {"port": "bad"}}
//! }));
//!
//! assert_eq!(config.value("port"), Some(&json!(8080)));
//! assert!(errors.contains(".name"));
//! assert!(errors.contains(r#".services["app"].port"#));
//! # Ok::<(), config_mapper::SchemaError>(())
//! ```
//!
//! # Source data
//!
//! Everything the mapper reads is a `serde_json::Value`: scalars, ordered
//! mappings and ordered sequences. The [`source`] module reduces JSON, TOML
//! (`toml` feature, on by default) and YAML (`yaml` feature) documents to
//! that shape, and [`merge::deep_merge`] layers several of them before
//! mapping.
//!
//! # Targets
//!
//! The mapper writes through the [`Target`] trait. Out of the box:
//!
//! - **[`ConfigStruct`]**, an instance of a declared [`Schema`].
//! - **[`ConfigDict`] / [`ConfigList`]**, lazily-populated collections of
//!   schema-typed entries.
//! - **Any [`Accessible`] type**, i.e. a plain Rust struct that lists its
//!   readers, writers and nested objects in an [`Accessors`] table.
//! - **`serde_json::Map` / `Vec<Value>` / `Value`**, which accept anything.
//!
//! # The mapping pass
//!
//! For every key in the source mapping (or every index in a sequence):
//!
//! - A nested mapping or sequence is merged into the target's nested object
//!   at that key when the key has no writer, or when a nested object is
//!   already there.
//! - Anything else goes through the key's writer.
//! - Failures are recorded against the key's path and mapping carries on.
//!
//! Paths concatenate `.name` segments for named attributes with `["key"]` and
//! `[index]` segments for collection entries, e.g. `.services["app"].port`.
//! The pass never fails fast; [`configure_with`] always returns the full
//! [`ErrorMapping`], and [`configure`] turns a non-empty one into a single
//! [`MappingError`].
//!
//! # Schemas
//!
//! A [`Schema`] is an ordered list of declarations:
//!
//! - **Attributes**, optionally coerced by a built-in [`TypeTag`] or a custom
//!   [`Coercer`]. An attribute without a default is required; a default of
//!   `Value::Null` makes it optional.
//! - **Components**, nested schema-typed objects created fresh per instance.
//! - **Collections**, keyed or indexed sets of schema-typed entries, with an
//!   optional key coercer. List entries are sparse: only indices that were
//!   accessed exist.
//!
//! Components and collection entries may instead be any [`Configurable`]
//! type, built by a factory closure (`Component::factory`,
//! `Collection::factory`).
//!
//! Schemas are built once, are immutable afterwards, and can extend a parent
//! schema. [`Schema::documentation`] derives path-keyed documentation from
//! the declarations alone, and [`Schema::from_config`] derives a whole schema
//! from a confique `Config` struct, doc comments and defaults included.
//!
//! # Error handling
//!
//! Per-field problems are [`FieldError`]s collected into an [`ErrorMapping`].
//! Invalid declarations fail [`SchemaBuilder::build`] with a [`SchemaError`].
//! The fallible convenience entry points ([`Schema::load`],
//! [`SchemaBuilder::load`], [`ConfigStruct::extract`] and the [`source`]
//! parsers) return [`Error`]. With the
//! `rich-errors` feature, [`MappingError`] is a `miette` diagnostic.

pub mod coerce;
pub mod docs;
pub mod error;
pub mod merge;
pub mod schema;
pub mod source;
pub mod target;
pub mod types;

mod collection;
mod config_struct;
mod mapper;
mod meta;
mod report;

#[cfg(test)]
mod fixtures;

pub use coerce::Coercer;
pub use collection::{ConfigDict, ConfigList, MAX_INDEX_GAP};
pub use config_struct::ConfigStruct;
pub use docs::FieldDoc;
pub use error::{Error, FieldError, SchemaError};
pub use mapper::{configure, configure_with};
pub use report::{ErrorMapping, MappingError};
pub use schema::{
    Attribute, AttributeDecl, Collection, CollectionDecl, CollectionKind, Component,
    ComponentDecl, Declaration, Schema, SchemaBuilder,
};
pub use serde_json::Value;
pub use target::{Accessible, Accessors, Configurable, Target};
pub use types::{Key, TypeTag};
