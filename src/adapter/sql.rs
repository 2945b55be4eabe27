//! SQL script adapter: writes `INSERT` statements to a file instead of a live
//! database, for review or for loading with the engine's own client.
//!
//! Primary keys are synthesized sequentially per table, so references in
//! later statements point at the keys written earlier in the same script.

use super::{assign_keys, primary_key, ConnectionConfig, StorageAdapter};
use crate::schema::{Record, TableOptions};
use ahash::AHashMap;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

/// Maximum rows per multi-row INSERT statement
pub const MAX_ROWS_PER_STATEMENT: usize = 500;

/// Target SQL dialect for generated statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    Sqlite,
}

impl std::str::FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            "sqlite" | "sqlite3" => Ok(SqlDialect::Sqlite),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: mysql, postgres, sqlite",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl SqlDialect {
    /// Quote an identifier; dotted names are quoted per part (`schema.table`)
    pub fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| match self {
                SqlDialect::MySql => format!("`{}`", part.replace('`', "``")),
                SqlDialect::Postgres | SqlDialect::Sqlite => {
                    format!("\"{}\"", part.replace('"', "\"\""))
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Format a string literal with the dialect's escaping rules
    pub fn format_string(&self, value: &str) -> String {
        match self {
            SqlDialect::MySql => {
                // MySQL uses backslash escaping
                let escaped = value
                    .replace('\\', "\\\\")
                    .replace('\'', "\\'")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t")
                    .replace('\0', "\\0");
                format!("'{}'", escaped)
            }
            SqlDialect::Postgres | SqlDialect::Sqlite => format!("'{}'", value.replace('\'', "''")),
        }
    }

    /// Format a JSON value as a SQL literal
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match (self, b) {
                (SqlDialect::Postgres, true) => "TRUE".to_string(),
                (SqlDialect::Postgres, false) => "FALSE".to_string(),
                (_, true) => "1".to_string(),
                (_, false) => "0".to_string(),
            },
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.format_string(s),
            Value::Array(_) | Value::Object(_) => self.format_string(&value.to_string()),
        }
    }
}

/// Writes seeded rows as INSERT statements
pub struct SqlScriptAdapter {
    dialect: SqlDialect,
    table_options: AHashMap<String, TableOptions>,
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
    next_key: AHashMap<String, i64>,
    statements: usize,
}

impl SqlScriptAdapter {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            table_options: AHashMap::new(),
            writer: None,
            next_key: AHashMap::new(),
            statements: 0,
        }
    }

    pub fn with_table_options(mut self, options: AHashMap<String, TableOptions>) -> Self {
        self.table_options = options;
        self
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Number of INSERT statements written so far
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    /// Render INSERT statements for one batch of rows
    fn render_inserts(&self, table: &str, records: &[Record]) -> Vec<String> {
        let columns: Vec<&String> = records
            .iter()
            .flat_map(|r| r.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let table_ident = self.dialect.quote_identifier(table);

        if columns.is_empty() {
            let stmt = match self.dialect {
                SqlDialect::MySql => format!("INSERT INTO {} () VALUES ();", table_ident),
                SqlDialect::Postgres | SqlDialect::Sqlite => {
                    format!("INSERT INTO {} DEFAULT VALUES;", table_ident)
                }
            };
            return vec![stmt; records.len()];
        }

        let column_list = columns
            .iter()
            .map(|c| self.dialect.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        records
            .chunks(MAX_ROWS_PER_STATEMENT)
            .map(|chunk| {
                let rows = chunk
                    .iter()
                    .map(|record| {
                        let values = columns
                            .iter()
                            .map(|c| self.dialect.format_value(record.get(*c).unwrap_or(&Value::Null)))
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("({})", values)
                    })
                    .collect::<Vec<_>>()
                    .join(",\n  ");
                format!("INSERT INTO {} ({}) VALUES\n  {};", table_ident, column_list, rows)
            })
            .collect()
    }
}

impl StorageAdapter for SqlScriptAdapter {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn connect(&mut self, config: &ConnectionConfig) -> anyhow::Result<()> {
        let output: Box<dyn Write + Send> = if config.target == "-" {
            Box::new(io::stdout())
        } else if config.is_in_memory() {
            bail!("The sql adapter needs an output file (use '-' for stdout)");
        } else {
            Box::new(
                File::create(&config.target)
                    .with_context(|| format!("Failed to create output file {}", config.target))?,
            )
        };

        let mut writer = BufWriter::new(output);
        writeln!(writer, "-- Generated by quick-seed ({} dialect)", self.dialect)?;
        info!(output = %config.target, dialect = %self.dialect, "writing sql script");
        self.writer = Some(writer);
        Ok(())
    }

    fn insert(&mut self, table: &str, records: Vec<Record>) -> anyhow::Result<Vec<Record>> {
        if self.writer.is_none() {
            bail!("SQL script adapter is not connected");
        }

        let pk = primary_key(&self.table_options, table);
        let next = self.next_key.entry(table.to_string()).or_insert(1);
        let inserted = assign_keys(pk, next, records)
            .with_context(|| format!("Failed to assign keys for {}", table))?;

        let statements = self.render_inserts(table, &inserted);
        let Some(writer) = self.writer.as_mut() else {
            bail!("SQL script adapter is not connected");
        };
        writeln!(writer)?;
        writeln!(writer, "-- {}: {} rows", table, inserted.len())?;
        for stmt in &statements {
            writeln!(writer, "{}", stmt)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write inserts for {}", table))?;

        self.statements += statements.len();
        debug!(table, rows = inserted.len(), statements = statements.len(), "sql insert");
        Ok(inserted)
    }

    fn disconnect(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!(error = %e, "failed to flush sql script");
            }
        }
    }
}
