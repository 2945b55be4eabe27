//! Schema dependency graph for FK-safe insertion order.
//!
//! Provides:
//! - Dependency graph construction from `Reference` fields
//! - Topological sorting for processing order
//! - Cycle detection naming the tables that cannot be ordered

use super::{FieldSpec, Schema, TableId};
use crate::error::SeedError;
use std::collections::VecDeque;

/// Schema dependency graph built from reference fields.
///
/// The graph represents parent → child relationships where:
/// - A parent is a table referenced by another table's field
/// - A child is a table that has a field referencing another table
///
/// Processing parents before children guarantees that a child's references
/// can be resolved against rows that are already inserted.
#[derive(Debug)]
pub struct SchemaGraph<'a> {
    /// The underlying schema
    pub schema: &'a Schema,
    /// For each table, list of parent tables (tables this table references)
    pub parents: Vec<Vec<TableId>>,
    /// For each table, list of child tables (tables that reference this table)
    pub children: Vec<Vec<TableId>>,
}

/// Result of topological sort
#[derive(Debug)]
pub struct TopoSortResult {
    /// Tables in topological order (parents before children)
    pub order: Vec<TableId>,
    /// Tables that could not be placed, in declaration order
    pub cyclic_tables: Vec<TableId>,
}

impl<'a> SchemaGraph<'a> {
    /// Build a dependency graph from a schema.
    ///
    /// References to tables outside the schema are ignored here; they fail
    /// later, when the field is resolved against the relationship store.
    pub fn from_schema(schema: &'a Schema) -> Self {
        let n = schema.len();
        let mut parents: Vec<Vec<TableId>> = vec![Vec::new(); n];
        let mut children: Vec<Vec<TableId>> = vec![Vec::new(); n];

        for (i, table) in schema.iter().enumerate() {
            let child_id = TableId(i as u32);

            for spec in table.fields.values() {
                let FieldSpec::Reference { table: target, .. } = spec else {
                    continue;
                };
                let Some(parent_id) = schema.get_table_id(target) else {
                    continue;
                };
                // Self-references never order a table after itself
                if parent_id == child_id {
                    continue;
                }
                if !parents[child_id.index()].contains(&parent_id) {
                    parents[child_id.index()].push(parent_id);
                }
                if !children[parent_id.index()].contains(&child_id) {
                    children[parent_id.index()].push(child_id);
                }
            }
        }

        Self {
            schema,
            parents,
            children,
        }
    }

    /// Get the number of tables in the graph
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Get the table name for a table ID
    pub fn table_name(&self, id: TableId) -> Option<&'a str> {
        self.schema.table(id).map(|t| t.name.as_str())
    }

    /// Get tables that have self-referential fields
    pub fn self_referential_tables(&self) -> Vec<TableId> {
        self.schema
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_self_reference())
            .map(|(i, _)| TableId(i as u32))
            .collect()
    }

    /// Get root tables (tables with no parents/dependencies)
    pub fn root_tables(&self) -> Vec<TableId> {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(i, _)| TableId(i as u32))
            .collect()
    }

    /// Perform topological sort using Kahn's algorithm.
    ///
    /// The ready queue is seeded in declaration order and drained FIFO, so
    /// ties between independent tables always resolve the same way.
    pub fn topo_sort(&self) -> TopoSortResult {
        let n = self.len();
        if n == 0 {
            return TopoSortResult {
                order: Vec::new(),
                cyclic_tables: Vec::new(),
            };
        }

        // In-degree = number of distinct parents not yet placed
        let mut in_degree: Vec<usize> = self.parents.iter().map(Vec::len).collect();

        let mut queue: VecDeque<TableId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(i, _)| TableId(i as u32))
            .collect();

        let mut order = Vec::with_capacity(n);

        while let Some(table_id) = queue.pop_front() {
            order.push(table_id);

            for &child_id in &self.children[table_id.index()] {
                in_degree[child_id.index()] -= 1;
                if in_degree[child_id.index()] == 0 {
                    queue.push_back(child_id);
                }
            }
        }

        // Anything still waiting on a parent sits on, or behind, a cycle
        let cyclic_tables: Vec<TableId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg > 0)
            .map(|(i, _)| TableId(i as u32))
            .collect();

        TopoSortResult {
            order,
            cyclic_tables,
        }
    }

    /// Insertion order as table IDs, or a cycle error naming the unplaced tables
    pub fn execution_order(&self) -> Result<Vec<TableId>, SeedError> {
        let result = self.topo_sort();
        if result.cyclic_tables.is_empty() {
            return Ok(result.order);
        }

        let tables = result
            .cyclic_tables
            .iter()
            .filter_map(|&id| self.table_name(id).map(str::to_string))
            .collect();
        Err(SeedError::Cycle { tables })
    }
}

/// Compute the table insertion order for a schema.
pub fn execution_order(schema: &Schema) -> Result<Vec<String>, SeedError> {
    let graph = SchemaGraph::from_schema(schema);
    let order = graph.execution_order()?;
    Ok(order
        .into_iter()
        .filter_map(|id| graph.table_name(id).map(str::to_string))
        .collect())
}
