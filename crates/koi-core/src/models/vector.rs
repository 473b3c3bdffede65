use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request to the vector/keyword backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorQuery {
    pub query: String,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<VectorFilters>,
    /// Keep undated documents when a date range is set.
    #[serde(default)]
    pub include_undated: bool,
}

impl VectorQuery {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            filters: None,
            include_undated: false,
        }
    }

    pub fn with_source_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.filters.get_or_insert_with(VectorFilters::default).source_sensor = Some(sensor.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.filters.get_or_insert_with(VectorFilters::default).date_range = Some(range);
        self
    }

    /// Requested source restriction, if any.
    pub fn source_sensor(&self) -> Option<&str> {
        self.filters.as_ref()?.source_sensor.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sensor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Inclusive publication date range, ISO-8601 strings as the backend expects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// One document returned by the vector backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMemory {
    /// Resource identifier.
    pub rid: String,
    #[serde(default, alias = "text")]
    pub content: String,
    #[serde(default, alias = "score")]
    pub similarity: f64,
    #[serde(default, alias = "source")]
    pub source_sensor: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Health summary reported by the vector backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHealth {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
}

impl VectorHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Corpus counters reported by the vector backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorStats {
    #[serde(default)]
    pub total_documents: u64,
    /// Documents ingested in the last seven days.
    #[serde(default)]
    pub recent_7_days: u64,
    #[serde(default)]
    pub by_source: BTreeMap<String, u64>,
}
