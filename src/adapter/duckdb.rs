//! Embedded DuckDB adapter.
//!
//! Each batch runs in its own transaction. How inserted rows are read back
//! depends on the table's [`ReturnStrategy`]:
//!
//! - `returning`: `INSERT ... RETURNING *`
//! - `sequential`: read `max(pk)` first, then select rows with a greater key
//! - `lookup`: read all keys first, then select rows whose key is new
//!
//! The row count read back must equal the number of records inserted.

use super::{primary_key, ConnectionConfig, SqlDialect, StorageAdapter, MAX_ROWS_PER_STATEMENT};
use crate::schema::{Record, ReturnStrategy, TableOptions};
use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Context};
use duckdb::types::{TimeUnit, Value as DuckValue, ValueRef};
use duckdb::{params_from_iter, Connection};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Storage adapter backed by an embedded DuckDB database
#[derive(Default)]
pub struct DuckDbAdapter {
    conn: Option<Connection>,
    setup_sql: Option<String>,
    table_options: AHashMap<String, TableOptions>,
    default_strategy: ReturnStrategy,
}

impl DuckDbAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL batch executed right after connecting, e.g. `CREATE TABLE` statements
    pub fn with_setup_sql(mut self, sql: impl Into<String>) -> Self {
        self.setup_sql = Some(sql.into());
        self
    }

    pub fn with_table_options(mut self, options: AHashMap<String, TableOptions>) -> Self {
        self.table_options = options;
        self
    }

    pub fn with_default_strategy(mut self, strategy: ReturnStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Underlying connection, while connected
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn strategy(&self, table: &str) -> ReturnStrategy {
        self.table_options
            .get(table)
            .and_then(|o| o.strategy)
            .unwrap_or(self.default_strategy)
    }
}

impl StorageAdapter for DuckDbAdapter {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn connect(&mut self, config: &ConnectionConfig) -> anyhow::Result<()> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory().context("Failed to create in-memory DuckDB database")?
        } else {
            Connection::open(&config.target)
                .with_context(|| format!("Failed to open DuckDB database {}", config.target))?
        };

        if let Some(ref sql) = self.setup_sql {
            conn.execute_batch(sql)
                .context("Failed to run DuckDB setup SQL")?;
        }

        info!(database = %config.target, "connected to duckdb");
        self.conn = Some(conn);
        Ok(())
    }

    fn insert(&mut self, table: &str, records: Vec<Record>) -> anyhow::Result<Vec<Record>> {
        let strategy = self.strategy(table);
        let pk = primary_key(&self.table_options, table).to_string();
        let Some(conn) = self.conn.as_mut() else {
            bail!("DuckDB adapter is not connected");
        };

        let expected = records.len();
        let tx = conn
            .transaction()
            .context("Failed to start DuckDB transaction")?;

        let inserted = match strategy {
            ReturnStrategy::Returning => insert_rows(&tx, table, &records, true)?,
            ReturnStrategy::Sequential => {
                let last = last_key(&tx, table, &pk)?;
                insert_rows(&tx, table, &records, false)?;
                let sql = format!(
                    "SELECT * FROM {} WHERE {} > ? ORDER BY {}",
                    quote(table),
                    quote(&pk),
                    quote(&pk)
                );
                query_records(&tx, &sql, &[DuckValue::BigInt(last.unwrap_or(i64::MIN))])?
            }
            ReturnStrategy::Lookup => {
                let existing = existing_keys(&tx, table, &pk)?;
                insert_rows(&tx, table, &records, false)?;
                let sql = format!("SELECT * FROM {}", quote(table));
                query_records(&tx, &sql, &[])?
                    .into_iter()
                    .filter(|r| {
                        r.get(&pk)
                            .is_some_and(|key| !existing.contains(&key.to_string()))
                    })
                    .collect()
            }
        };

        if inserted.len() != expected {
            // Dropping the transaction rolls the batch back
            bail!(
                "Inserted row count mismatch for table {}: expected {}, read back {} ({} strategy)",
                table,
                expected,
                inserted.len(),
                strategy
            );
        }

        tx.commit()
            .with_context(|| format!("Failed to commit insert into {}", table))?;
        debug!(table, rows = inserted.len(), %strategy, "duckdb insert");
        Ok(inserted)
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(error = %e, "failed to close duckdb connection");
            }
        }
    }
}

fn quote(name: &str) -> String {
    SqlDialect::Postgres.quote_identifier(name)
}

/// Insert records, in statements of at most `MAX_ROWS_PER_STATEMENT` rows.
/// With `returning`, collects the inserted rows.
fn insert_rows(
    conn: &Connection,
    table: &str,
    records: &[Record],
    returning: bool,
) -> anyhow::Result<Vec<Record>> {
    let suffix = if returning { " RETURNING *" } else { "" };
    let mut inserted = Vec::new();

    if records.is_empty() {
        return Ok(inserted);
    }
    let columns: Vec<&String> = records
        .iter()
        .flat_map(|r| r.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // No columns: every column takes its default
    if columns.is_empty() {
        let sql = format!("INSERT INTO {} DEFAULT VALUES{}", quote(table), suffix);
        for _ in records {
            if returning {
                inserted.extend(query_records(conn, &sql, &[])?);
            } else {
                conn.execute(&sql, [])
                    .with_context(|| format!("Failed to insert into {}", table))?;
            }
        }
        return Ok(inserted);
    }

    let column_list = columns
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

    for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}{}",
            quote(table),
            column_list,
            vec![placeholders.as_str(); chunk.len()].join(", "),
            suffix
        );

        let mut params = Vec::with_capacity(chunk.len() * columns.len());
        for record in chunk {
            for column in &columns {
                params.push(json_to_duckdb(record.get(*column).unwrap_or(&Value::Null)));
            }
        }

        if returning {
            inserted.extend(query_records(conn, &sql, &params)?);
        } else {
            conn.execute(&sql, params_from_iter(params.iter()))
                .with_context(|| format!("Failed to insert into {}", table))?;
        }
    }

    Ok(inserted)
}

fn last_key(conn: &Connection, table: &str, pk: &str) -> anyhow::Result<Option<i64>> {
    let sql = format!("SELECT max({}) FROM {}", quote(pk), quote(table));
    conn.query_row(&sql, [], |row| row.get::<_, Option<i64>>(0))
        .with_context(|| format!("Failed to read last key of {}", table))
}

fn existing_keys(conn: &Connection, table: &str, pk: &str) -> anyhow::Result<AHashSet<String>> {
    let sql = format!("SELECT {} FROM {}", quote(pk), quote(table));
    Ok(query_records(conn, &sql, &[])?
        .into_iter()
        .filter_map(|r| r.get(pk).map(Value::to_string))
        .collect())
}

/// Run a query and convert every row to a record keyed by column name
fn query_records(conn: &Connection, sql: &str, params: &[DuckValue]) -> anyhow::Result<Vec<Record>> {
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("Failed to prepare query: {}", sql))?;
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .with_context(|| format!("Failed to execute query: {}", sql))?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        if columns.is_empty() {
            let stmt = row.as_ref();
            columns = (0..stmt.column_count())
                .map(|i| {
                    stmt.column_name(i)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|_| format!("col{}", i))
                })
                .collect();
        }

        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            let value = duckdb_to_json(row.get_ref(i)?)
                .with_context(|| format!("Failed to read column {}", column))?;
            record.insert(column.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Bind a JSON value as a DuckDB parameter. Arrays and objects become JSON text.
fn json_to_duckdb(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DuckValue::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                DuckValue::UBigInt(u)
            } else {
                DuckValue::Double(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => DuckValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => DuckValue::Text(value.to_string()),
    }
}

/// Convert one result cell back to JSON
fn duckdb_to_json(value: ValueRef<'_>) -> anyhow::Result<Value> {
    owned_to_json(DuckValue::from(value))
}

fn owned_to_json(value: DuckValue) -> anyhow::Result<Value> {
    Ok(match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::from(n),
        DuckValue::SmallInt(n) => Value::from(n),
        DuckValue::Int(n) => Value::from(n),
        DuckValue::BigInt(n) => Value::from(n),
        DuckValue::HugeInt(n) => match i64::try_from(n) {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(n.to_string()),
        },
        DuckValue::UHugeInt(n) => match u64::try_from(n) {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(n.to_string()),
        },
        DuckValue::UTinyInt(n) => Value::from(n),
        DuckValue::USmallInt(n) => Value::from(n),
        DuckValue::UInt(n) => Value::from(n),
        DuckValue::UBigInt(n) => Value::from(n),
        DuckValue::Float(f) => Value::from(f as f64),
        DuckValue::Double(f) => Value::from(f),
        DuckValue::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(d.to_string())),
        DuckValue::Text(s) => Value::String(s),
        DuckValue::Enum(label) => Value::String(label),
        DuckValue::Blob(b) => Value::String(String::from_utf8_lossy(&b).to_string()),
        DuckValue::Timestamp(unit, ts) => {
            let (secs, nanos) = split_epoch(ts, unit);
            match chrono::DateTime::from_timestamp(secs, nanos) {
                Some(dt) => Value::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
                None => Value::from(ts),
            }
        }
        DuckValue::Date32(days) => {
            // 719163 = days from 0001-01-01 to 1970-01-01
            match chrono::NaiveDate::from_num_days_from_ce_opt(719163 + days) {
                Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
                None => Value::from(days),
            }
        }
        DuckValue::Time64(unit, t) => {
            let (secs, nanos) = split_epoch(t, unit);
            match u32::try_from(secs)
                .ok()
                .and_then(|secs| chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
            {
                Some(time) => Value::String(time.format("%H:%M:%S%.f").to_string()),
                None => Value::from(t),
            }
        }
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => Value::String(format!(
            "{} months {} days {} microseconds",
            months,
            days,
            nanos / 1000
        )),
        DuckValue::List(items) | DuckValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(owned_to_json)
                .collect::<anyhow::Result<_>>()?,
        ),
        DuckValue::Struct(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, v)| Ok((name.clone(), owned_to_json(v.clone())?)))
                .collect::<anyhow::Result<_>>()?,
        ),
        DuckValue::Union(inner) => owned_to_json(*inner)?,
        other => bail!("Unsupported DuckDB column value: {:?}", other),
    })
}

/// Split an epoch offset in `unit` into whole seconds and nanoseconds
fn split_epoch(value: i64, unit: TimeUnit) -> (i64, u32) {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let secs = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    (secs, nanos as u32)
}
