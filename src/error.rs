use thiserror::Error;

use crate::report::MappingError;

/// A problem with a single field, recorded against its path.
///
/// These are collected into an [`ErrorMapping`](crate::ErrorMapping) by the
/// mapper and by `config_errors()`; they never abort a mapping pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The target has no accessor for the key.
    #[error("undefined attribute '{0}'")]
    AttributeNotFound(String),

    /// A validator, coercer or writer rejected the raw value.
    #[error("{0}")]
    InvalidValue(String),

    /// A required attribute is still null.
    #[error("no value provided")]
    NoValueProvided,
}

impl FieldError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        FieldError::InvalidValue(reason.into())
    }
}

/// An invalid declaration, reported when a schema is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Unknown type '{0}' (expected one of Integer, Float, String, Boolean, Array)")]
    UnknownType(String),

    #[error("Declaration names must not be empty")]
    EmptyName,
}

/// Crate-level error for the fallible convenience entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Failed to parse {format}: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },

    #[error("Failed to extract typed config: {0}")]
    Extract(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_value_provided_message() {
        assert_eq!(FieldError::NoValueProvided.to_string(), "no value provided");
    }

    #[test]
    fn attribute_not_found_names_key() {
        let err = FieldError::AttributeNotFound("attitude".into());
        assert!(err.to_string().contains("attitude"));
    }

    #[test]
    fn unknown_type_lists_known_tags() {
        let msg = SchemaError::UnknownType("Intger".into()).to_string();
        assert!(msg.contains("Intger"));
        assert!(msg.contains("Integer"));
    }

    #[test]
    fn parse_error_formats() {
        let err = Error::Parse {
            format: "TOML",
            reason: "expected `=`".into(),
        };
        assert_eq!(err.to_string(), "Failed to parse TOML: expected `=`");
    }
}
