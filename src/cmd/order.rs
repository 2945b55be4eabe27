//! Order command - show the table seeding order of a schema.

use crate::config::SeedYamlConfig;
use crate::schema::{load_schema_files, SchemaGraph, TableId};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for the order command
#[derive(Serialize, JsonSchema)]
pub(crate) struct OrderJsonOutput {
    /// Table names in seeding order
    order: Vec<String>,
    tables: Vec<OrderedTable>,
    /// Tables that reference no other table
    roots: Vec<String>,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct OrderedTable {
    name: String,
    count: usize,
    /// Tables that must be seeded first
    depends_on: Vec<String>,
    self_referencing: bool,
}

pub fn run(schemas: Vec<PathBuf>, config: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let file_config = SeedYamlConfig::discover(config.as_deref())?;
    let schema_paths = super::resolve_schema_paths(schemas, file_config.as_ref())?;
    let schema = load_schema_files(&schema_paths)?;

    let graph = SchemaGraph::from_schema(&schema);
    let order = graph.execution_order()?;

    let name = |id: TableId| graph.table_name(id).unwrap_or_default().to_string();
    let tables: Vec<OrderedTable> = order
        .iter()
        .filter_map(|&id| {
            let table = schema.table(id)?;
            Some(OrderedTable {
                name: table.name.clone(),
                count: table.count,
                depends_on: graph.parents[id.index()].iter().map(|&p| name(p)).collect(),
                self_referencing: table.has_self_reference(),
            })
        })
        .collect();

    let output = OrderJsonOutput {
        order: tables.iter().map(|t| t.name.clone()).collect(),
        roots: graph.root_tables().into_iter().map(name).collect(),
        tables,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Seeding order ({} tables):", output.tables.len());
    for (i, table) in output.tables.iter().enumerate() {
        let mut line = format!("  {}. {} ({} records)", i + 1, table.name, table.count);
        if !table.depends_on.is_empty() {
            line.push_str(&format!(" ← {}", table.depends_on.join(", ")));
        }
        if table.self_referencing {
            line.push_str(" [self-referencing]");
        }
        println!("{}", line);
    }

    Ok(())
}
