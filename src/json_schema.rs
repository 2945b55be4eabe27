//! JSON Schema generation for CLI output types.
//!
//! Every command with `--json` output has a schema here, exported via the
//! `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas for commands that support --json output.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // generators command
    schemas.insert(
        "generators",
        schema_for!(crate::cmd::generators::GeneratorsJsonOutput),
    );

    // order command
    schemas.insert("order", schema_for!(crate::cmd::order::OrderJsonOutput));

    // seed command (the run summary)
    schemas.insert("seed", schema_for!(crate::seeder::SeedSummary));

    schemas
}

/// Generate a single schema by command name.
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
