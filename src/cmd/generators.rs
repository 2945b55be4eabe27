//! Generators command - list registered generator paths.

use crate::faker::GeneratorRegistry;
use anyhow::bail;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON output for the generators command
#[derive(Serialize, JsonSchema)]
pub(crate) struct GeneratorsJsonOutput {
    total: usize,
    /// Namespace → generator paths
    namespaces: BTreeMap<String, Vec<String>>,
}

pub fn run(namespace: Option<String>, json: bool) -> anyhow::Result<()> {
    let registry = GeneratorRegistry::builtin();

    let mut namespaces: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in registry.paths() {
        let ns = path.split('.').next().unwrap_or(path);
        if namespace.as_deref().is_some_and(|want| want != ns) {
            continue;
        }
        namespaces
            .entry(ns.to_string())
            .or_default()
            .push(path.to_string());
    }

    if namespaces.is_empty() {
        if let Some(ns) = namespace {
            bail!(
                "Unknown namespace: {}. Valid namespaces: {}",
                ns,
                registry.namespaces().join(", ")
            );
        }
    }

    let output = GeneratorsJsonOutput {
        total: namespaces.values().map(Vec::len).sum(),
        namespaces,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (ns, paths) in &output.namespaces {
        println!("{}:", ns);
        for path in paths {
            println!("  {}", path);
        }
    }
    eprintln!("\n{} generators", output.total);

    Ok(())
}
