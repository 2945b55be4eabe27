//! Storage adapters: the seam between the seeder and a concrete engine.
//!
//! An adapter owns one connection, inserts batches of generated records and
//! hands back the inserted rows with any keys the engine generated. The
//! seeder only ever talks to the [`StorageAdapter`] trait.

mod duckdb;
mod memory;
mod sql;

pub use self::duckdb::DuckDbAdapter;
pub use memory::MemoryAdapter;
pub use sql::{SqlDialect, SqlScriptAdapter, MAX_ROWS_PER_STATEMENT};

use crate::schema::{Record, ReturnStrategy, TableOptions};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Connection target handed to [`StorageAdapter::connect`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    /// Database path, `:memory:`, or output file, depending on the adapter
    pub target: String,
}

impl ConnectionConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Target for engines that can run without a file
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    pub fn is_in_memory(&self) -> bool {
        self.target.is_empty() || self.target == ":memory:"
    }
}

/// Connection lifecycle and batch insertion against one engine.
pub trait StorageAdapter: Send {
    /// Short adapter name for logs
    fn name(&self) -> &'static str;

    /// Open the connection. Called once per seed run.
    fn connect(&mut self, config: &ConnectionConfig) -> anyhow::Result<()>;

    /// Insert records into `table`, returning the inserted rows including
    /// generated keys, in insertion order.
    fn insert(&mut self, table: &str, records: Vec<Record>) -> anyhow::Result<Vec<Record>>;

    /// Close the connection. Idempotent and safe when `connect` never succeeded.
    fn disconnect(&mut self);
}

impl<A: StorageAdapter + ?Sized> StorageAdapter for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn connect(&mut self, config: &ConnectionConfig) -> anyhow::Result<()> {
        (**self).connect(config)
    }

    fn insert(&mut self, table: &str, records: Vec<Record>) -> anyhow::Result<Vec<Record>> {
        (**self).insert(table, records)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}

/// Built-in adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Keep rows in process memory
    #[default]
    Memory,
    /// Embedded DuckDB database
    DuckDb,
    /// Write INSERT statements to a SQL file
    Sql,
}

impl std::str::FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(AdapterKind::Memory),
            "duckdb" => Ok(AdapterKind::DuckDb),
            "sql" => Ok(AdapterKind::Sql),
            _ => Err(format!(
                "Unknown adapter: {}. Valid options: memory, duckdb, sql",
                s
            )),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Memory => write!(f, "memory"),
            AdapterKind::DuckDb => write!(f, "duckdb"),
            AdapterKind::Sql => write!(f, "sql"),
        }
    }
}

/// Settings shared by the built-in adapters
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// Per-table primary key and return strategy
    pub table_options: AHashMap<String, TableOptions>,
    /// Strategy for tables that do not set one (DuckDB)
    pub default_strategy: ReturnStrategy,
    /// SQL run right after connecting (DuckDB)
    pub setup_sql: Option<String>,
    /// Output dialect (SQL script)
    pub dialect: SqlDialect,
}

/// Build a boxed adapter of the given kind
pub fn create_adapter(kind: AdapterKind, options: AdapterOptions) -> Box<dyn StorageAdapter> {
    match kind {
        AdapterKind::Memory => Box::new(MemoryAdapter::new().with_table_options(options.table_options)),
        AdapterKind::DuckDb => {
            let mut adapter = DuckDbAdapter::new()
                .with_table_options(options.table_options)
                .with_default_strategy(options.default_strategy);
            if let Some(sql) = options.setup_sql {
                adapter = adapter.with_setup_sql(sql);
            }
            Box::new(adapter)
        }
        AdapterKind::Sql => Box::new(
            SqlScriptAdapter::new(options.dialect).with_table_options(options.table_options),
        ),
    }
}

/// Primary key column for a table, honouring its options
pub(crate) fn primary_key<'a>(options: &'a AHashMap<String, TableOptions>, table: &str) -> &'a str {
    options
        .get(table)
        .map(TableOptions::primary_key)
        .unwrap_or(crate::schema::DEFAULT_PRIMARY_KEY)
}

/// Fill in missing integer primary keys from a per-table counter.
///
/// Records that already carry a key keep it, and the counter moves past it.
/// Fails when the counter would pass `i64::MAX`.
pub(crate) fn assign_keys(
    pk: &str,
    next: &mut i64,
    records: Vec<Record>,
) -> anyhow::Result<Vec<Record>> {
    let mut assigned = Vec::with_capacity(records.len());
    for mut record in records {
        match record.get(pk) {
            Some(Value::Null) | None => {
                let key = *next;
                *next = key
                    .checked_add(1)
                    .ok_or_else(|| anyhow::anyhow!("Primary key {} overflows i64", pk))?;
                record.insert(pk.to_string(), Value::from(key));
            }
            Some(key) => {
                if let Some(key) = key.as_i64() {
                    let after = key.checked_add(1).ok_or_else(|| {
                        anyhow::anyhow!(
                            "Primary key {} = {} leaves no room for generated keys",
                            pk,
                            key
                        )
                    })?;
                    *next = (*next).max(after);
                }
            }
        }
        assigned.push(record);
    }
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_kind_parse() {
        assert_eq!("DuckDB".parse::<AdapterKind>().unwrap(), AdapterKind::DuckDb);
        assert_eq!("sql".parse::<AdapterKind>().unwrap(), AdapterKind::Sql);
        assert!("postgres".parse::<AdapterKind>().is_err());
        assert_eq!(AdapterKind::Memory.to_string(), "memory");
    }

    #[test]
    fn test_primary_key_lookup() {
        let mut options = AHashMap::new();
        options.insert(
            "projects".to_string(),
            TableOptions {
                primary_key: Some("project_id".to_string()),
                strategy: None,
            },
        );
        assert_eq!(primary_key(&options, "projects"), "project_id");
        assert_eq!(primary_key(&options, "users"), "id");
    }

    #[test]
    fn test_factory_names() {
        let options = AdapterOptions::default();
        assert_eq!(create_adapter(AdapterKind::Memory, options.clone()).name(), "memory");
        assert_eq!(create_adapter(AdapterKind::DuckDb, options.clone()).name(), "duckdb");
        assert_eq!(create_adapter(AdapterKind::Sql, options).name(), "sql");
    }

    fn keyed(id: Value) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), id);
        record
    }

    #[test]
    fn test_assign_keys_moves_past_explicit_keys() {
        let mut next = 1;
        let rows = assign_keys("id", &mut next, vec![keyed(Value::from(10)), Record::new()]).unwrap();
        assert_eq!(rows[1]["id"], Value::from(11));
        assert_eq!(next, 12);
    }

    #[test]
    fn test_assign_keys_rejects_overflow() {
        let mut next = 1;
        assert!(assign_keys("id", &mut next, vec![keyed(Value::from(i64::MAX))]).is_err());

        let mut next = i64::MAX;
        assert!(assign_keys("id", &mut next, vec![Record::new()]).is_err());
        assert_eq!(next, i64::MAX);
    }
}
