//! Fixture knowledge tables and scripted in-memory backends shared by the
//! tests of every KOI crate.

mod backends;

use std::path::PathBuf;

use koi_core::config::TablesConfig;
use koi_core::models::GraphRow;
use serde::de::DeserializeOwned;

pub use backends::{
    GraphBehavior, MockGraphBackend, MockSimilarity, MockVectorBackend, VectorBehavior,
};

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Table locations for the fixture vocabulary (Regen ledger modules).
pub fn tables_config() -> TablesConfig {
    TablesConfig {
        consolidation_path: Some(fixture_path("tables/consolidation.json")),
        communities_path: Some(fixture_path("tables/communities.json")),
        entities_path: Some(fixture_path("tables/entities.json")),
    }
}

/// A graph row in the shape the executor asks for.
pub fn triple_row(subject: &str, predicate: &str, object: &str) -> GraphRow {
    let mut row = GraphRow::new();
    row.insert("subject".into(), subject.into());
    row.insert("predicate".into(), predicate.into());
    row.insert("object".into(), object.into());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_tables_exist() {
        let config = tables_config();
        for path in [
            config.consolidation_path,
            config.communities_path,
            config.entities_path,
        ] {
            assert!(path.unwrap().exists());
        }
    }

    #[test]
    fn entities_fixture_parses() {
        let value = load_fixture_value("tables/entities.json");
        assert!(value.as_array().map(|a| !a.is_empty()).unwrap_or(false));
    }
}
