//! Init command - write a starter config and schema.

use crate::adapter::AdapterKind;
use crate::config::{config_template, DEFAULT_CONFIG_FILE, SCHEMA_TEMPLATE};
use anyhow::{bail, Context};
use std::fs;
use std::path::PathBuf;

const SCHEMA_FILE: &str = "schema.yaml";

pub fn run(dir: PathBuf, adapter: String, force: bool) -> anyhow::Result<()> {
    let kind = adapter
        .parse::<AdapterKind>()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let files = [
        (dir.join(DEFAULT_CONFIG_FILE), config_template(kind, SCHEMA_FILE)),
        (dir.join(SCHEMA_FILE), SCHEMA_TEMPLATE.to_string()),
    ];

    if !force {
        if let Some((path, _)) = files.iter().find(|(path, _)| path.exists()) {
            bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
    }

    for (path, content) in &files {
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Created {}", path.display());
    }

    eprintln!("\nRun `quick-seed seed` in {} to seed.", dir.display());
    Ok(())
}
