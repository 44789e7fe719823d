//! Persistent table cache (spec §4.6): keyed by `(projectId, tableName)`,
//! storing `(version, fetchedAt, rows)`. `InMemoryTableCache` is the one
//! implementation this core ships; a disk-backed one is a documented
//! extension point, not a requirement (persistence is out of scope, spec §1).

use crate::row::Table;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    pub rows: Table,
}

/// Abstraction over the persistent cache so `DataManager` doesn't hardcode
/// an in-memory implementation (spec §4.6 "pluggable `TableCache` trait").
pub trait TableCache: Send + Sync {
    fn get(&self, project_id: &str, table_name: &str) -> Option<CacheEntry>;
    fn put(&self, project_id: &str, table_name: &str, entry: CacheEntry);
    fn invalidate(&self, project_id: &str, table_name: &str);
}

#[derive(Default)]
pub struct InMemoryTableCache {
    entries: Mutex<HashMap<(String, String), CacheEntry>>,
}

impl InMemoryTableCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableCache for InMemoryTableCache {
    fn get(&self, project_id: &str, table_name: &str) -> Option<CacheEntry> {
        self.entries
            .lock()
            .expect("table cache mutex poisoned")
            .get(&(project_id.to_string(), table_name.to_string()))
            .cloned()
    }

    fn put(&self, project_id: &str, table_name: &str, entry: CacheEntry) {
        self.entries
            .lock()
            .expect("table cache mutex poisoned")
            .insert((project_id.to_string(), table_name.to_string()), entry);
    }

    fn invalidate(&self, project_id: &str, table_name: &str) {
        self.entries
            .lock()
            .expect("table cache mutex poisoned")
            .remove(&(project_id.to_string(), table_name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    #[test]
    fn put_then_get_roundtrips() {
        let cache = InMemoryTableCache::new();
        cache.put(
            "proj",
            "Users",
            CacheEntry {
                version: "v1".to_string(),
                fetched_at: Utc::now(),
                rows: vec![Row::new()],
            },
        );
        let entry = cache.get("proj", "Users").unwrap();
        assert_eq!(entry.version, "v1");
    }

    #[test]
    fn invalidate_drops_entry() {
        let cache = InMemoryTableCache::new();
        cache.put(
            "proj",
            "Users",
            CacheEntry {
                version: "v1".to_string(),
                fetched_at: Utc::now(),
                rows: vec![],
            },
        );
        cache.invalidate("proj", "Users");
        assert!(cache.get("proj", "Users").is_none());
    }
}
