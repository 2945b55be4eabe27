//! Relationship store: the rows inserted so far in a seed run.
//!
//! Foreign keys are resolved against this store, so a table's entry is only
//! written after the storage adapter has confirmed the insert and returned
//! rows carrying their generated keys.

use crate::error::SeedError;
use crate::schema::Record;
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

/// Run-scoped mapping of table name to its inserted records.
#[derive(Debug, Default)]
pub struct RelationshipStore {
    tables: AHashMap<String, Arc<Vec<Record>>>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored records for a table. Never merges with a previous set.
    pub fn add_records(&mut self, table: &str, records: Vec<Record>) {
        self.tables.insert(table.to_string(), Arc::new(records));
    }

    /// Pick one record of `table` uniformly at random.
    pub fn random_record(&self, table: &str, rng: &mut StdRng) -> Result<&Record, SeedError> {
        let records = self
            .records(table)
            .filter(|records| !records.is_empty())
            .ok_or_else(|| SeedError::UnseededReference {
                table: table.to_string(),
            })?;
        Ok(&records[rng.random_range(0..records.len())])
    }

    pub fn records(&self, table: &str) -> Option<&[Record]> {
        self.tables.get(table).map(|records| records.as_slice())
    }

    /// True if the table has at least one stored record
    pub fn has_records(&self, table: &str) -> bool {
        self.records(table).is_some_and(|records| !records.is_empty())
    }

    /// Number of tables with an entry
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Read-only view of the current contents for custom generators
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tables: self.tables.clone(),
        }
    }
}

/// Immutable view of a [`RelationshipStore`].
///
/// Record sets are shared with the store; they can be read or cloned, but a
/// snapshot has no way to change what the store holds.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    tables: AHashMap<String, Arc<Vec<Record>>>,
}

impl StoreSnapshot {
    /// Records of a table, empty if the table has not been seeded
    pub fn records(&self, table: &str) -> &[Record] {
        self.tables
            .get(table)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Names of seeded tables, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.tables.values().map(|records| records.len()).sum()
    }
}
