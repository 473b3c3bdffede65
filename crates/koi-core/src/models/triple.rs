use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GraphRow;

/// Fusion identity of a statement.
pub type TripleKey = (String, String, String);

/// A subject–predicate–object statement. Subjects and objects are free-text
/// literals, not node identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            confidence: None,
        }
    }

    pub fn key(&self) -> TripleKey {
        (
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }

    /// Convert a graph row with `subject`/`predicate`/`object` columns.
    ///
    /// Graph stores that return agtype text wrap strings in double quotes;
    /// those are stripped. Returns `None` when a column is missing or null.
    pub fn from_row(row: &GraphRow) -> Option<Self> {
        let subject = column_text(row.get("subject")?)?;
        let predicate = column_text(row.get("predicate")?)?;
        let object = column_text(row.get("object")?)?;
        let confidence = row.get("confidence").and_then(Value::as_f64);
        Some(Self {
            subject,
            predicate,
            object,
            confidence,
        })
    }
}

fn column_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(s);
            Some(trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}
