//! Seed schema model.
//!
//! This module provides:
//! - Data models for tables, their record counts and field specifications
//! - YAML/JSON schema file loading into the closed `FieldSpec` variant
//! - Dependency graph construction with topological sorting
//! - Cycle detection for circular references

mod graph;
mod loader;

pub use graph::*;
pub use loader::*;

use crate::error::SeedError;
use crate::faker::{Faker, GeneratorRegistry};
use crate::store::StoreSnapshot;
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A generated or inserted row: field name → value.
pub type Record = serde_json::Map<String, Value>;

/// Signature of a custom field generator.
pub type CustomGenerator = dyn Fn(&mut Faker, &StoreSnapshot) -> Value + Send + Sync;

/// Default primary key column used by adapters when a table does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Unique identifier for a table within a schema (its declaration index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

impl TableId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// How one field's value is produced.
#[derive(Clone)]
pub enum FieldSpec {
    /// Dotted path of a registered generator, e.g. `person.fullName`
    Literal(String),
    /// Arbitrary function of the generator library and the seeded data so far
    Custom(Arc<CustomGenerator>),
    /// Copy `field` from a random already-inserted record of `table`
    Reference { table: String, field: String },
}

impl FieldSpec {
    pub fn literal(path: impl Into<String>) -> Self {
        FieldSpec::Literal(path.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut Faker, &StoreSnapshot) -> Value + Send + Sync + 'static,
    {
        FieldSpec::Custom(Arc::new(f))
    }

    pub fn reference(table: impl Into<String>, field: impl Into<String>) -> Self {
        FieldSpec::Reference {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Parse a `table.field` reference target.
    ///
    /// The last dot separates the field, so `public.users.id` references
    /// field `id` of table `public.users`.
    pub fn parse_reference(target: &str) -> Result<Self, SeedError> {
        match target.rsplit_once('.') {
            Some((table, field)) if !table.is_empty() && !field.is_empty() => {
                Ok(FieldSpec::reference(table, field))
            }
            _ => Err(SeedError::Schema(format!(
                "invalid reference '{}': expected 'table.field'",
                target
            ))),
        }
    }

    /// Table targeted by this field, if it is a reference
    pub fn referenced_table(&self) -> Option<&str> {
        match self {
            FieldSpec::Reference { table, .. } => Some(table),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::Literal(path) => f.debug_tuple("Literal").field(path).finish(),
            FieldSpec::Custom(_) => f.write_str("Custom(<fn>)"),
            FieldSpec::Reference { table, field } => f
                .debug_struct("Reference")
                .field("table", table)
                .field("field", field)
                .finish(),
        }
    }
}

/// How an adapter recovers inserted rows (with generated keys) after an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStrategy {
    /// `INSERT ... RETURNING *`
    #[default]
    Returning,
    /// Read the highest key before inserting, then rows with a greater key
    Sequential,
    /// Read all existing keys before inserting, then rows not among them
    Lookup,
}

impl std::str::FromStr for ReturnStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "returning" => Ok(ReturnStrategy::Returning),
            "sequential" => Ok(ReturnStrategy::Sequential),
            "lookup" => Ok(ReturnStrategy::Lookup),
            _ => Err(format!(
                "Unknown return strategy: {}. Valid options: returning, sequential, lookup",
                s
            )),
        }
    }
}

impl fmt::Display for ReturnStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnStrategy::Returning => write!(f, "returning"),
            ReturnStrategy::Sequential => write!(f, "sequential"),
            ReturnStrategy::Lookup => write!(f, "lookup"),
        }
    }
}

/// Adapter-specific table options. The seeding core never reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct TableOptions {
    /// Primary key column (defaults to `id`)
    #[serde(alias = "pk")]
    pub primary_key: Option<String>,
    /// Strategy for reading inserted rows back
    pub strategy: Option<ReturnStrategy>,
}

impl TableOptions {
    pub fn primary_key(&self) -> &str {
        self.primary_key.as_deref().unwrap_or(DEFAULT_PRIMARY_KEY)
    }
}

/// One table's record count and field specifications
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Table name
    pub name: String,
    /// Number of records to generate
    pub count: usize,
    /// Field name → generation rule
    pub fields: BTreeMap<String, FieldSpec>,
    /// Adapter-specific options
    pub options: TableOptions,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            fields: BTreeMap::new(),
            options: TableOptions::default(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Tables referenced by this table's fields, self included, in field order
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.fields.values().filter_map(FieldSpec::referenced_table)
    }

    /// Check if any field references this table itself
    pub fn has_self_reference(&self) -> bool {
        self.references().any(|t| t == self.name)
    }
}

/// Complete seed schema: tables in declaration order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<TableSpec>,
    name_to_id: AHashMap<String, TableId>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from tables in declaration order, rejecting duplicates
    pub fn from_tables(tables: impl IntoIterator<Item = TableSpec>) -> Result<Self, SeedError> {
        let mut schema = Schema::new();
        for table in tables {
            schema.add_table(table)?;
        }
        Ok(schema)
    }

    /// Add a table, failing if the name is already declared
    pub fn add_table(&mut self, table: TableSpec) -> Result<TableId, SeedError> {
        if self.name_to_id.contains_key(&table.name) {
            return Err(SeedError::Schema(format!(
                "table '{}' is declared more than once",
                table.name
            )));
        }
        Ok(self.push(table))
    }

    /// Add a table or replace the one with the same name, keeping its position
    pub fn upsert_table(&mut self, table: TableSpec) -> TableId {
        match self.name_to_id.get(&table.name) {
            Some(&id) => {
                self.tables[id.index()] = table;
                id
            }
            None => self.push(table),
        }
    }

    /// Merge another schema into this one; tables of `other` win on name clashes
    pub fn merge(&mut self, other: Schema) {
        for table in other.tables {
            self.upsert_table(table);
        }
    }

    fn push(&mut self, table: TableSpec) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.name_to_id.insert(table.name.clone(), id);
        self.tables.push(table);
        id
    }

    pub fn get_table_id(&self, name: &str) -> Option<TableId> {
        self.name_to_id.get(name).copied()
    }

    pub fn table(&self, id: TableId) -> Option<&TableSpec> {
        self.tables.get(id.index())
    }

    pub fn get(&self, name: &str) -> Option<&TableSpec> {
        self.get_table_id(name).and_then(|id| self.table(id))
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Sum of all record counts
    pub fn total_records(&self) -> u64 {
        self.tables.iter().map(|t| t.count as u64).sum()
    }

    /// Per-table adapter options, for adapters that honour them
    pub fn table_options(&self) -> AHashMap<String, TableOptions> {
        self.tables
            .iter()
            .map(|t| (t.name.clone(), t.options.clone()))
            .collect()
    }

    /// Check every literal field against the generator registry.
    ///
    /// Fails on the first unknown path in declaration order, naming the
    /// table, the field and the registry's top-level namespaces.
    pub fn validate_generators(&self, registry: &GeneratorRegistry) -> Result<(), SeedError> {
        for table in &self.tables {
            for (field, spec) in &table.fields {
                if let FieldSpec::Literal(path) = spec {
                    if !registry.contains(path) {
                        return Err(SeedError::UnknownGenerator {
                            table: table.name.clone(),
                            field: field.clone(),
                            path: path.clone(),
                            namespaces: registry.namespaces(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        match FieldSpec::parse_reference("users.id").unwrap() {
            FieldSpec::Reference { table, field } => {
                assert_eq!(table, "users");
                assert_eq!(field, "id");
            }
            other => panic!("Expected Reference, got {:?}", other),
        }

        assert_eq!(
            FieldSpec::parse_reference("public.users.id")
                .unwrap()
                .referenced_table(),
            Some("public.users")
        );
        assert!(FieldSpec::parse_reference("users").is_err());
        assert!(FieldSpec::parse_reference(".id").is_err());
        assert!(FieldSpec::parse_reference("users.").is_err());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut schema = Schema::new();
        schema.add_table(TableSpec::new("users", 1)).unwrap();
        let err = schema.add_table(TableSpec::new("users", 2)).unwrap_err();
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut schema =
            Schema::from_tables([TableSpec::new("a", 1), TableSpec::new("b", 1)]).unwrap();
        schema.upsert_table(TableSpec::new("a", 7));

        assert_eq!(schema.table_names(), vec!["a", "b"]);
        assert_eq!(schema.get("a").unwrap().count, 7);
        assert_eq!(schema.total_records(), 8);
    }

    #[test]
    fn test_self_reference_detection() {
        let table = TableSpec::new("tasks", 5)
            .with_field("parent_id", FieldSpec::reference("tasks", "id"))
            .with_field("title", FieldSpec::literal("lorem.sentence"));
        assert!(table.has_self_reference());
        assert_eq!(table.references().collect::<Vec<_>>(), vec!["tasks"]);
    }
}
