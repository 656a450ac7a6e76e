//! Path-keyed error collections and the aggregate "construct-or-raise" error.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::error::FieldError;

/// Errors collected during a mapping or validation pass, keyed by path.
///
/// Paths look like `.position.y`, `.services["app"].port` or `[1].attitude`.
/// Inserting at a path that already holds an error replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMapping {
    errors: BTreeMap<String, FieldError>,
}

impl ErrorMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, error: FieldError) {
        self.errors.insert(path.into(), error);
    }

    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.errors.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldError> {
        self.errors.iter()
    }

    /// Merge errors from a nested target, re-prefixing each path with `prefix`.
    pub fn merge_prefixed(&mut self, prefix: &str, nested: ErrorMapping) {
        for (path, error) in nested {
            self.errors.insert(format!("{prefix}{path}"), error);
        }
    }

    /// `Ok(())` when empty, otherwise the aggregate [`MappingError`].
    pub fn into_result(self) -> Result<(), MappingError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MappingError::new(self))
        }
    }
}

impl Index<&str> for ErrorMapping {
    type Output = FieldError;

    fn index(&self, path: &str) -> &FieldError {
        &self.errors[path]
    }
}

impl IntoIterator for ErrorMapping {
    type Item = (String, FieldError);
    type IntoIter = btree_map::IntoIter<String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorMapping {
    type Item = (&'a String, &'a FieldError);
    type IntoIter = btree_map::Iter<'a, String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl Extend<(String, FieldError)> for ErrorMapping {
    fn extend<I: IntoIterator<Item = (String, FieldError)>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl FromIterator<(String, FieldError)> for ErrorMapping {
    fn from_iter<I: IntoIterator<Item = (String, FieldError)>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Serializes as `{ path: message }`.
impl Serialize for ErrorMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (path, error) in &self.errors {
            map.serialize_entry(path, &error.to_string())?;
        }
        map.end()
    }
}

/// Every field that failed in one pass, raised as a single error.
///
/// ```text
/// configuration error
///   position.y - invalid value for Integer: "juan"
///   name - no value provided
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_message(.errors))]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
#[cfg_attr(
    feature = "rich-errors",
    diagnostic(
        code(config_mapper::mapping_error),
        help("each line names the offending path and what was wrong with it")
    )
)]
pub struct MappingError {
    errors: ErrorMapping,
}

impl MappingError {
    pub fn new(errors: ErrorMapping) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &ErrorMapping {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorMapping {
        self.errors
    }
}

fn render_message(errors: &ErrorMapping) -> String {
    let mut message = String::from("configuration error");
    for (path, error) in errors {
        let field = path.strip_prefix('.').unwrap_or(path);
        message.push_str(&format!("\n  {field} - {error}"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ErrorMapping {
        let mut errors = ErrorMapping::new();
        errors.insert(".y", FieldError::InvalidValue("bad".into()));
        errors.insert(".z", FieldError::AttributeNotFound("z".into()));
        errors
    }

    #[test]
    fn later_insert_wins() {
        let mut errors = ErrorMapping::new();
        errors.insert(".x", FieldError::NoValueProvided);
        errors.insert(".x", FieldError::InvalidValue("late".into()));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[".x"], FieldError::InvalidValue("late".into()));
    }

    #[test]
    fn merge_prefixed_concatenates_paths() {
        let mut outer = ErrorMapping::new();
        outer.merge_prefixed(r#"["mary"]"#, sample());
        let paths: Vec<&str> = outer.paths().collect();
        assert_eq!(paths, vec![r#"["mary"].y"#, r#"["mary"].z"#]);
    }

    #[test]
    fn empty_into_result_is_ok() {
        assert!(ErrorMapping::new().into_result().is_ok());
    }

    #[test]
    fn mapping_error_message_lists_each_path() {
        let err = sample().into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error\n  y - bad\n  z - undefined attribute 'z'"
        );
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn message_keeps_bracketed_paths_intact() {
        let mut errors = ErrorMapping::new();
        errors.insert(r#"["app"].port"#, FieldError::NoValueProvided);
        let err = MappingError::new(errors);
        assert!(err.to_string().contains(r#"["app"].port - no value provided"#));
    }

    #[test]
    fn serializes_messages_by_path() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json[".y"], "bad");
        assert_eq!(json[".z"], "undefined attribute 'z'");
    }
}
