//! `DataManager`: the Data Query Engine's runtime surface (spec §4.6).
//!
//! Owns the read-only table snapshots a test run queries against, the
//! persistent cache, and the smart bulk-fetch protocol that bounds a
//! preload to at most two round trips against the data service.

use crate::cache::{CacheEntry, TableCache};
use crate::cancel::CancelToken;
use crate::query_builder::QueryBuilder;
use crate::row::Table;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct TableVersionInfo {
    pub version: String,
    pub row_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum DataServiceError {
    #[error("data service request failed: {0}")]
    Request(String),
    #[error("data service returned an unexpected response: {0}")]
    Protocol(String),
}

/// The opaque data-service collaborator (spec §6.4): the compiler never
/// calls these, only the runtime. Implemented by `vero-query` callers over
/// whatever transport their data service actually speaks; `vero-query`
/// itself provides `HttpDataServiceClient` as the default HTTP-JSON binding.
#[async_trait::async_trait]
pub trait DataServiceClient: Send + Sync {
    async fn fetch_table(&self, name: &str) -> Result<Table, DataServiceError>;
    async fn get_version_manifest(&self) -> Result<HashMap<String, TableVersionInfo>, DataServiceError>;
    async fn bulk_fetch(
        &self,
        table_names: &[String],
        if_none_match: &HashMap<String, String>,
    ) -> Result<HashMap<String, (String, Table)>, DataServiceError>;
    async fn notify_table_modified(&self, name: &str);
}

pub const DEFAULT_MAX_AGE: ChronoDuration = ChronoDuration::hours(24);

struct LoadedTable {
    rows: Table,
}

/// Owns live table snapshots plus the persistent cache (spec §4.6
/// invariants: query methods never mutate cached rows; cache entries are
/// mutated only by `preload_tables`/`refresh_table`/`invalidate_table`).
pub struct DataManager {
    project_id: String,
    client: Box<dyn DataServiceClient>,
    cache: Box<dyn TableCache>,
    max_age: ChronoDuration,
    loaded: RwLock<HashMap<String, LoadedTable>>,
}

impl DataManager {
    pub fn new(project_id: impl Into<String>, client: Box<dyn DataServiceClient>, cache: Box<dyn TableCache>) -> Self {
        Self {
            project_id: project_id.into(),
            client,
            cache,
            max_age: DEFAULT_MAX_AGE,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_max_age(mut self, max_age: ChronoDuration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Cached bulk preload (spec §4.6 "Smart bulk fetch"): at most two
    /// server round trips regardless of table count (P8).
    ///
    /// 1. `getVersionManifest()`.
    /// 2. `bulkFetch(stale_names)` for tables whose cached version is
    ///    missing, stale, or expired by `max_age`.
    ///
    /// Falls back to a per-table fetch for every requested table if either
    /// call fails.
    pub async fn preload_tables(&self, names: &[String], cancel: &CancelToken) -> Result<(), DataServiceError> {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let manifest = match self.client.get_version_manifest().await {
            Ok(m) => m,
            Err(_) => return self.preload_tables_per_table(names, cancel).await,
        };

        let now = Utc::now();
        let mut stale = Vec::new();
        let mut fresh_from_cache: HashMap<String, Table> = HashMap::new();

        for name in names {
            let server_info = manifest.get(name);
            let cached = self.cache.get(&self.project_id, name);
            let reuse_cached = match (&cached, server_info) {
                (Some(entry), Some(info)) => {
                    entry.version == info.version && now - entry.fetched_at < self.max_age
                }
                _ => false,
            };
            if reuse_cached {
                fresh_from_cache.insert(name.clone(), cached.unwrap().rows);
            } else {
                stale.push(name.clone());
            }
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        if !stale.is_empty() {
            let if_none_match: HashMap<String, String> = stale
                .iter()
                .filter_map(|n| self.cache.get(&self.project_id, n).map(|e| (n.clone(), e.version)))
                .collect();

            match self.client.bulk_fetch(&stale, &if_none_match).await {
                Ok(fetched) => {
                    for (name, (version, rows)) in fetched {
                        self.cache.put(
                            &self.project_id,
                            &name,
                            CacheEntry {
                                version,
                                fetched_at: now,
                                rows: rows.clone(),
                            },
                        );
                        fresh_from_cache.insert(name, rows);
                    }
                }
                Err(_) => return self.preload_tables_per_table(names, cancel).await,
            }
        }

        let mut loaded = self.loaded.write().expect("data manager lock poisoned");
        for (name, rows) in fresh_from_cache {
            loaded.insert(name, LoadedTable { rows });
        }
        Ok(())
    }

    async fn preload_tables_per_table(&self, names: &[String], cancel: &CancelToken) -> Result<(), DataServiceError> {
        for name in names {
            if cancel.is_cancelled() {
                break;
            }
            self.refresh_table(name).await?;
        }
        Ok(())
    }

    /// Invalidates then fetches a single table (spec: "refreshTable
    /// invalidates then fetches").
    pub async fn refresh_table(&self, name: &str) -> Result<(), DataServiceError> {
        self.invalidate_table(name);
        let rows = self.client.fetch_table(name).await?;
        self.cache.put(
            &self.project_id,
            name,
            CacheEntry {
                version: Utc::now().to_rfc3339(),
                fetched_at: Utc::now(),
                rows: rows.clone(),
            },
        );
        self.loaded
            .write()
            .expect("data manager lock poisoned")
            .insert(name.to_string(), LoadedTable { rows });
        Ok(())
    }

    pub fn invalidate_table(&self, name: &str) {
        self.cache.invalidate(&self.project_id, name);
        self.loaded.write().expect("data manager lock poisoned").remove(name);
    }

    pub fn is_table_loaded(&self, name: &str) -> bool {
        self.loaded.read().expect("data manager lock poisoned").contains_key(name)
    }

    pub fn get_loaded_tables(&self) -> Vec<String> {
        self.loaded.read().expect("data manager lock poisoned").keys().cloned().collect()
    }

    /// Builds a `QueryBuilder` over the table's current snapshot. Panics if
    /// the table was never loaded — mirrors calling `.query()` on an
    /// un-preloaded table in the host runtime, which is a caller bug, not a
    /// recoverable runtime condition.
    pub fn query(&self, name: &str) -> QueryBuilder {
        let loaded = self.loaded.read().expect("data manager lock poisoned");
        let table = loaded
            .get(name)
            .unwrap_or_else(|| panic!("table '{}' was not preloaded before query()", name));
        QueryBuilder::new(table.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryTableCache;
    use crate::row::{Row, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeClient {
        manifest_calls: Arc<AtomicUsize>,
        bulk_calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl DataServiceClient for FakeClient {
        async fn fetch_table(&self, _name: &str) -> Result<Table, DataServiceError> {
            Ok(vec![Row::from_iter([("id".to_string(), Value::Number(1.0))])])
        }

        async fn get_version_manifest(&self) -> Result<HashMap<String, TableVersionInfo>, DataServiceError> {
            self.manifest_calls.fetch_add(1, Ordering::SeqCst);
            let mut m = HashMap::new();
            m.insert(
                "Users".to_string(),
                TableVersionInfo { version: "vA'".to_string(), row_count: 1, updated_at: Utc::now() },
            );
            m.insert(
                "Products".to_string(),
                TableVersionInfo { version: "vB".to_string(), row_count: 1, updated_at: Utc::now() },
            );
            m.insert(
                "Orders".to_string(),
                TableVersionInfo { version: "vC".to_string(), row_count: 1, updated_at: Utc::now() },
            );
            Ok(m)
        }

        async fn bulk_fetch(
            &self,
            table_names: &[String],
            _if_none_match: &HashMap<String, String>,
        ) -> Result<HashMap<String, (String, Table)>, DataServiceError> {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            Ok(table_names
                .iter()
                .map(|n| (n.clone(), ("new".to_string(), vec![Row::new()])))
                .collect())
        }

        async fn notify_table_modified(&self, _name: &str) {}
    }

    #[tokio::test]
    async fn smart_preload_issues_exactly_two_round_trips() {
        let manifest_calls = Arc::new(AtomicUsize::new(0));
        let bulk_calls = Arc::new(AtomicUsize::new(0));
        let cache = InMemoryTableCache::new();
        cache.put(
            "proj",
            "Users",
            CacheEntry { version: "vA".to_string(), fetched_at: Utc::now(), rows: vec![] },
        );
        cache.put(
            "proj",
            "Products",
            CacheEntry { version: "vB".to_string(), fetched_at: Utc::now(), rows: vec![Row::new()] },
        );
        let manager = DataManager::new(
            "proj",
            Box::new(FakeClient { manifest_calls: manifest_calls.clone(), bulk_calls: bulk_calls.clone() }),
            Box::new(cache),
        );

        let names = vec!["Users".to_string(), "Products".to_string(), "Orders".to_string()];
        manager.preload_tables(&names, &CancelToken::new()).await.unwrap();

        assert_eq!(manifest_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bulk_calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_table_loaded("Products"));
        assert_eq!(manager.query("Products").row_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_then_is_table_loaded_false() {
        let cache = InMemoryTableCache::new();
        let manager = DataManager::new(
            "proj",
            Box::new(FakeClient { manifest_calls: Arc::new(AtomicUsize::new(0)), bulk_calls: Arc::new(AtomicUsize::new(0)) }),
            Box::new(cache),
        );
        manager.refresh_table("Users").await.unwrap();
        assert!(manager.is_table_loaded("Users"));
        manager.invalidate_table("Users");
        assert!(!manager.is_table_loaded("Users"));
    }
}
