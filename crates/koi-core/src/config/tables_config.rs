use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Locations of the offline-built knowledge tables. Missing paths mean empty tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub consolidation_path: Option<PathBuf>,
    pub communities_path: Option<PathBuf>,
    pub entities_path: Option<PathBuf>,
}
