//! Schema command - export JSON Schemas of --json output.

use crate::json_schema;
use anyhow::{bail, Context};
use std::fs;
use std::path::PathBuf;

pub fn run(command: Option<String>, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let schemas = match command {
        Some(name) => match json_schema::get_schema(&name) {
            Some(schema) => vec![(name, schema)],
            None => bail!(
                "No JSON schema for command: {}. Available: {}",
                name,
                json_schema::schema_names().join(", ")
            ),
        },
        None => json_schema::all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                fs::write(&path, serde_json::to_string_pretty(schema)? + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let all: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| Ok((name, serde_json::to_value(schema)?)))
                .collect::<serde_json::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}
