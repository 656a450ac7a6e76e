//! Machine-readable documentation derived from schema declarations.
//!
//! [`Schema::documentation`](crate::Schema::documentation) produces a sorted
//! map of path to [`FieldDoc`]. It serializes directly (for JSON/YAML
//! output), or [`render`] turns it into commented plain text.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// What is known about one documented path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl FieldDoc {
    pub(crate) fn described(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::default()
        }
    }
}

/// Render documentation as text, one block per path:
///
/// ```text
/// # The port to listen on.
/// .port (Integer) = 5000
/// ```
pub fn render(docs: &BTreeMap<String, FieldDoc>) -> String {
    let mut out = String::new();
    for (i, (path, doc)) in docs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(description) = &doc.description {
            for line in description.lines() {
                out.push_str(&format!("# {line}\n"));
            }
        }
        out.push_str(path);
        if let Some(type_name) = &doc.type_name {
            out.push_str(&format!(" ({type_name})"));
        }
        if let Some(default) = &doc.default {
            out.push_str(&format!(" = {default}"));
        }
        out.push('\n');
    }
    out
}
