//! JSON table loading. A missing or unreadable table is an empty table.

use std::path::Path;

use koi_core::config::TablesConfig;
use koi_observability::events;
use serde::de::DeserializeOwned;

use super::{CommunityFile, ConsolidationMap, EntityRecord, KnowledgeTables};

impl KnowledgeTables {
    /// Load all tables from the configured paths. Never fails.
    pub fn load(config: &TablesConfig) -> Self {
        let consolidation: ConsolidationMap =
            read_table("consolidation", config.consolidation_path.as_deref());
        let communities: CommunityFile =
            read_table("communities", config.communities_path.as_deref());
        let entities: Vec<EntityRecord> = read_table("entities", config.entities_path.as_deref());

        let tables = Self::new(consolidation, communities.communities, entities);
        events::tables_loaded("consolidation", tables.consolidation.len());
        events::tables_loaded("communities", tables.communities.len());
        events::tables_loaded("entities", tables.entities.len());
        tables
    }
}

fn read_table<T: DeserializeOwned + Default>(table: &str, path: Option<&Path>) -> T {
    let Some(path) = path else {
        tracing::debug!(table, "no path configured, using empty table");
        return T::default();
    };
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(table, path = %path.display(), error = %e, "table unreadable, using empty table");
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(table, path = %path.display(), error = %e, "table malformed, using empty table");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn fixture_tables_load() {
        let tables = KnowledgeTables::load(&test_fixtures::tables_config());
        assert_eq!(tables.consolidation.usage("hasField"), 1200);
        assert_eq!(tables.canonical_of("takesParam"), Some("hasParameter"));
        assert_eq!(tables.communities.community_of("handles"), Some(1));
        assert!(tables.entities.iter().any(|e| e.name == "MsgSend"));
    }

    #[test]
    fn missing_files_yield_empty_tables() {
        let config = TablesConfig {
            consolidation_path: Some("/nonexistent/consolidation.json".into()),
            communities_path: None,
            entities_path: None,
        };
        let tables = KnowledgeTables::load(&config);
        assert!(tables.consolidation.is_empty());
        assert!(tables.communities.is_empty());
        assert!(tables.entities.is_empty());
    }

    #[test]
    fn malformed_file_yields_empty_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let config = TablesConfig {
            entities_path: Some(file.path().to_path_buf()),
            ..TablesConfig::default()
        };
        assert!(KnowledgeTables::load(&config).entities.is_empty());
    }
}
