//! Seed command: load schemas, pick an adapter and run the seeder.

use crate::adapter::{create_adapter, AdapterKind, AdapterOptions, ConnectionConfig, SqlDialect};
use crate::config::SeedYamlConfig;
use crate::progress::SeedProgress;
use crate::schema::{load_schema_files, ReturnStrategy};
use crate::seeder::Seeder;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run(
    schemas: Vec<PathBuf>,
    config: Option<PathBuf>,
    adapter: Option<String>,
    connection: Option<String>,
    setup: Option<PathBuf>,
    dialect: Option<String>,
    strategy: Option<String>,
    seed: Option<u64>,
    progress: bool,
    json: bool,
) -> anyhow::Result<()> {
    let file_config = SeedYamlConfig::discover(config.as_deref())?;
    let schema_paths = super::resolve_schema_paths(schemas, file_config.as_ref())?;
    let file_config = file_config.unwrap_or_default();

    let kind = match adapter {
        Some(a) => a.parse::<AdapterKind>().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => file_config.adapter.unwrap_or_default(),
    };
    let dialect = match dialect {
        Some(d) => d.parse::<SqlDialect>().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => file_config.dialect.unwrap_or_default(),
    };
    let default_strategy = match strategy {
        Some(s) => s
            .parse::<ReturnStrategy>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => file_config.strategy.unwrap_or_default(),
    };
    let connection = connection
        .or(file_config.connection)
        .unwrap_or_else(|| default_connection(kind).to_string());
    let seed = seed.or(file_config.seed);

    let setup_sql = match setup.or(file_config.setup) {
        Some(path) => Some(
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read setup SQL {}", path.display()))?,
        ),
        None => None,
    };
    if setup_sql.is_some() && kind != AdapterKind::DuckDb {
        tracing::warn!(adapter = %kind, "setup SQL is only run by the duckdb adapter");
    }

    let schema = load_schema_files(&schema_paths)?;

    if !json {
        eprintln!(
            "Seeding {} tables ({} records) with the {} adapter",
            schema.len(),
            schema.total_records(),
            kind
        );
    }

    let adapter = create_adapter(
        kind,
        AdapterOptions {
            table_options: schema.table_options(),
            default_strategy,
            setup_sql,
            dialect,
        },
    );

    let mut seeder = Seeder::new(adapter);
    if let Some(seed) = seed {
        seeder = seeder.with_seed(seed);
    }

    let bars = (progress && !json).then(SeedProgress::new);
    if let Some(ref bars) = bars {
        seeder = seeder.with_progress(bars.listener());
    }

    let summary = match seeder.seed(&schema, &ConnectionConfig::new(connection.clone())) {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(ref bars) = bars {
                bars.abandon();
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    eprintln!("\n✓ Seeding completed successfully!");
    eprintln!("\nTables (in order):");
    for table in &summary.tables {
        if table.skipped {
            eprintln!("  - {}: skipped (0 records)", table.name);
        } else {
            eprintln!("  - {}: {} records", table.name, table.inserted);
        }
    }
    eprintln!("\nStatistics:");
    eprintln!("  Records inserted: {}", summary.total_records);
    eprintln!("  Elapsed time: {:.3}s", summary.elapsed_secs);
    match kind {
        AdapterKind::Memory => eprintln!("\nMemory adapter: nothing was persisted."),
        AdapterKind::DuckDb | AdapterKind::Sql if connection != "-" => {
            eprintln!("\nOutput: {}", connection)
        }
        _ => {}
    }

    Ok(())
}

fn default_connection(kind: AdapterKind) -> &'static str {
    match kind {
        AdapterKind::Memory | AdapterKind::DuckDb => ":memory:",
        AdapterKind::Sql => "seed.sql",
    }
}
