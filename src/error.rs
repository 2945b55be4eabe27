//! Error types for a seed run.

use thiserror::Error;

/// Errors that abort a seed run.
///
/// Every variant is fatal: the seeder never retries and never downgrades an
/// error to a warning. The only recovery it performs is disconnecting the
/// storage adapter before the error reaches the caller.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The dependency graph has a cycle; names the tables that could not be placed.
    #[error("Circular dependency detected involving tables: {}", .tables.join(", "))]
    Cycle { tables: Vec<String> },

    /// A literal field names a generator path that is not registered.
    #[error(
        "Unknown generator '{path}' for field '{field}' in table '{table}'. Valid namespaces: {}",
        .namespaces.join(", ")
    )]
    UnknownGenerator {
        table: String,
        field: String,
        path: String,
        namespaces: Vec<String>,
    },

    /// A reference targets a table with no rows in the relationship store.
    #[error(
        "Cannot get a random record from table \"{table}\" because it has not been seeded yet or has no records."
    )]
    UnseededReference { table: String },

    /// The referenced parent record does not carry the referenced field.
    #[error("Referenced field '{field}' is missing from records of table \"{table}\"")]
    MissingReferenceField { table: String, field: String },

    /// The schema definition is malformed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Connect or insert failure reported by the storage adapter.
    #[error(transparent)]
    Adapter(#[from] anyhow::Error),
}

impl SeedError {
    /// Table names carried by a cycle error, if this is one.
    pub fn cycle_tables(&self) -> Option<&[String]> {
        match self {
            SeedError::Cycle { tables } => Some(tables),
            _ => None,
        }
    }
}
