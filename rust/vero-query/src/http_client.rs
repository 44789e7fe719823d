//! `HttpDataServiceClient`: the default HTTP-JSON binding for the opaque
//! data-service collaborator of spec §6.4, following the same
//! request/response handling as the crate's HTTP provider layer but async
//! (spec §5: the manager's fetch points are `async fn`s).

use crate::manager::{DataServiceClient, DataServiceError, TableVersionInfo};
use crate::row::{Row, Table, Value};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub struct HttpDataServiceClient {
    base_url: String,
    client: Client,
}

impl HttpDataServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { base_url: base_url.into(), client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Deserialize)]
struct RawRow(HashMap<String, serde_json::Value>);

fn json_value_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
        serde_json::Value::Bool(b) => Value::Boolean(b),
        _ => Value::Null,
    }
}

fn raw_rows_to_table(rows: Vec<RawRow>) -> Table {
    rows.into_iter()
        .map(|RawRow(columns)| columns.into_iter().map(|(k, v)| (k, json_value_to_value(v))).collect::<Row>())
        .collect()
}

#[derive(Deserialize)]
struct ManifestEntry {
    version: String,
    #[serde(rename = "rowCount")]
    row_count: i64,
    #[serde(rename = "updatedAt")]
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct BulkFetchTableEntry {
    version: String,
    data: Vec<RawRow>,
}

#[derive(Deserialize)]
struct BulkFetchResponse {
    tables: HashMap<String, BulkFetchTableEntry>,
}

#[async_trait::async_trait]
impl DataServiceClient for HttpDataServiceClient {
    async fn fetch_table(&self, name: &str) -> Result<Table, DataServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("tables/{}", name)))
            .send()
            .await
            .map_err(|e| DataServiceError::Request(e.to_string()))?;
        let rows: Vec<RawRow> = resp
            .json()
            .await
            .map_err(|e| DataServiceError::Protocol(e.to_string()))?;
        Ok(raw_rows_to_table(rows))
    }

    async fn get_version_manifest(&self) -> Result<HashMap<String, TableVersionInfo>, DataServiceError> {
        let resp = self
            .client
            .get(self.url("tables/manifest"))
            .send()
            .await
            .map_err(|e| DataServiceError::Request(e.to_string()))?;
        let manifest: HashMap<String, ManifestEntry> = resp
            .json()
            .await
            .map_err(|e| DataServiceError::Protocol(e.to_string()))?;
        Ok(manifest
            .into_iter()
            .map(|(name, entry)| {
                (
                    name,
                    TableVersionInfo {
                        version: entry.version,
                        row_count: entry.row_count,
                        updated_at: entry.updated_at,
                    },
                )
            })
            .collect())
    }

    async fn bulk_fetch(
        &self,
        table_names: &[String],
        if_none_match: &HashMap<String, String>,
    ) -> Result<HashMap<String, (String, Table)>, DataServiceError> {
        let resp = self
            .client
            .post(self.url("tables/bulk-fetch"))
            .json(&serde_json::json!({ "tableNames": table_names, "ifNoneMatch": if_none_match }))
            .send()
            .await
            .map_err(|e| DataServiceError::Request(e.to_string()))?;
        let body: BulkFetchResponse = resp
            .json()
            .await
            .map_err(|e| DataServiceError::Protocol(e.to_string()))?;
        Ok(body
            .tables
            .into_iter()
            .map(|(name, entry)| (name, (entry.version, raw_rows_to_table(entry.data))))
            .collect())
    }

    async fn notify_table_modified(&self, name: &str) {
        let _ = self
            .client
            .post(self.url(&format!("tables/{}/notify-modified", name)))
            .send()
            .await;
    }
}
