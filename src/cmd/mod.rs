pub(crate) mod generators;
mod init;
pub(crate) mod order;
mod schema;
mod seed;

use crate::config::DEFAULT_CONFIG_FILE;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quick-seed")]
#[command(version)]
#[command(about = "Seed relational databases with relationally consistent fake data", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate records for every table of a schema and insert them
    Seed {
        /// Schema files (.yaml, .yml, .json), merged in order.
        /// Defaults to the `schemas` list of the config file.
        schemas: Vec<PathBuf>,

        /// Config file (default: ./quick-seed.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Storage adapter: memory, duckdb, or sql
        #[arg(short, long)]
        adapter: Option<String>,

        /// Adapter target: DuckDB path or :memory:, or SQL output file ('-' for stdout)
        #[arg(long)]
        connection: Option<String>,

        /// SQL file to run after connecting (duckdb)
        #[arg(long)]
        setup: Option<PathBuf>,

        /// SQL dialect for the sql adapter: mysql, postgres, or sqlite
        #[arg(short, long)]
        dialect: Option<String>,

        /// Default strategy for reading inserted rows back: returning, sequential, or lookup
        #[arg(long)]
        strategy: Option<String>,

        /// Random seed for reproducible values
        #[arg(long)]
        seed: Option<u64>,

        /// Show progress during seeding
        #[arg(short, long)]
        progress: bool,

        /// Output the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the order tables will be seeded in
    Order {
        /// Schema files (.yaml, .yml, .json), merged in order
        schemas: Vec<PathBuf>,

        /// Config file (default: ./quick-seed.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available generator paths
    Generators {
        /// Only list generators of this namespace (e.g. person)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter config file and schema
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Adapter for the generated config: memory, duckdb, or sql
        #[arg(short, long, default_value = "duckdb")]
        adapter: String,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print the JSON Schema of a command's --json output
    Schema {
        /// Command name (all schemas when omitted)
        command: Option<String>,

        /// Write one `<command>.schema.json` file per command into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Seed {
            schemas,
            config,
            adapter,
            connection,
            setup,
            dialect,
            strategy,
            seed,
            progress,
            json,
        } => seed::run(
            schemas, config, adapter, connection, setup, dialect, strategy, seed, progress, json,
        ),
        Commands::Order {
            schemas,
            config,
            json,
        } => order::run(schemas, config, json),
        Commands::Generators { namespace, json } => generators::run(namespace, json),
        Commands::Init {
            dir,
            adapter,
            force,
        } => init::run(dir, adapter, force),
        Commands::Schema {
            command,
            output_dir,
        } => schema::run(command, output_dir),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "quick-seed", &mut io::stdout());
            Ok(())
        }
    }
}

/// Schema files from the command line, or from the config file when none are given
fn resolve_schema_paths(
    schemas: Vec<PathBuf>,
    config: Option<&crate::config::SeedYamlConfig>,
) -> anyhow::Result<Vec<PathBuf>> {
    if !schemas.is_empty() {
        return Ok(schemas);
    }
    match config {
        Some(config) if !config.schemas.is_empty() => Ok(config.schemas.clone()),
        _ => anyhow::bail!(
            "No schema files given. Pass schema files or list them under 'schemas' in {}",
            DEFAULT_CONFIG_FILE
        ),
    }
}
