//! In-process adapter: rows live in a map for the lifetime of the adapter.

use super::{assign_keys, primary_key, ConnectionConfig, StorageAdapter};
use crate::schema::{Record, TableOptions};
use ahash::AHashMap;
use anyhow::{bail, Context};
use tracing::debug;

/// Stores rows per table and assigns auto-increment keys.
///
/// Rows survive `disconnect`, so tests and callers can inspect what a run
/// inserted after it has finished.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    tables: AHashMap<String, Vec<Record>>,
    next_key: AHashMap<String, i64>,
    table_options: AHashMap<String, TableOptions>,
    connected: bool,
    connects: usize,
    disconnects: usize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_options(mut self, options: AHashMap<String, TableOptions>) -> Self {
        self.table_options = options;
        self
    }

    /// Rows inserted into `table` so far
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Table names with at least one insert, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of completed `connect` calls
    pub fn connect_count(&self) -> usize {
        self.connects
    }

    /// Number of `disconnect` calls that closed an open connection
    pub fn disconnect_count(&self) -> usize {
        self.disconnects
    }
}

impl StorageAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn connect(&mut self, _config: &ConnectionConfig) -> anyhow::Result<()> {
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    fn insert(&mut self, table: &str, records: Vec<Record>) -> anyhow::Result<Vec<Record>> {
        if !self.connected {
            bail!("Memory adapter is not connected");
        }

        let pk = primary_key(&self.table_options, table);
        let next = self.next_key.entry(table.to_string()).or_insert(1);
        let inserted = assign_keys(pk, next, records)
            .with_context(|| format!("Failed to assign keys for {}", table))?;

        debug!(table, rows = inserted.len(), "memory insert");
        self.tables
            .entry(table.to_string())
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.disconnects += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_insert_requires_connection() {
        let mut adapter = MemoryAdapter::new();
        assert!(adapter.insert("users", vec![Record::new()]).is_err());
    }

    #[test]
    fn test_assigns_sequential_keys_across_batches() {
        let mut adapter = MemoryAdapter::new();
        adapter.connect(&ConnectionConfig::in_memory()).unwrap();

        let first = adapter.insert("users", vec![Record::new(), Record::new()]).unwrap();
        let second = adapter.insert("users", vec![Record::new()]).unwrap();

        assert_eq!(first[0]["id"], json!(1));
        assert_eq!(first[1]["id"], json!(2));
        assert_eq!(second[0]["id"], json!(3));
        assert_eq!(adapter.rows("users").len(), 3);
    }

    #[test]
    fn test_keeps_explicit_keys_and_custom_pk() {
        let mut options = AHashMap::new();
        options.insert(
            "orgs".to_string(),
            TableOptions {
                primary_key: Some("org_id".to_string()),
                strategy: None,
            },
        );
        let mut adapter = MemoryAdapter::new().with_table_options(options);
        adapter.connect(&ConnectionConfig::in_memory()).unwrap();

        let rows = adapter
            .insert("orgs", vec![record(json!({"org_id": 10})), Record::new()])
            .unwrap();
        assert_eq!(rows[0]["org_id"], json!(10));
        assert_eq!(rows[1]["org_id"], json!(11));
        assert!(rows[1].get("id").is_none());
    }

    #[test]
    fn test_max_key_is_an_error_not_a_panic() {
        let mut adapter = MemoryAdapter::new();
        adapter.connect(&ConnectionConfig::in_memory()).unwrap();

        let err = adapter
            .insert("users", vec![record(json!({"id": i64::MAX}))])
            .unwrap_err();
        assert!(format!("{:#}", err).contains("users"));
        assert!(adapter.rows("users").is_empty());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut adapter = MemoryAdapter::new();
        adapter.disconnect();
        adapter.connect(&ConnectionConfig::in_memory()).unwrap();
        adapter.disconnect();
        adapter.disconnect();

        assert!(!adapter.is_connected());
        assert_eq!(adapter.connect_count(), 1);
        assert_eq!(adapter.disconnect_count(), 1);
    }
}
