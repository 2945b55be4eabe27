//! Schema file loading.
//!
//! A schema file is a YAML (or JSON) mapping of table name to table
//! definition. Table declaration order is preserved because it decides
//! ties in the insertion order.
//!
//! ```yaml
//! organizations:
//!   count: 3
//!   fields:
//!     name: company.name
//! projects:
//!   count: 5
//!   fields:
//!     name: commerce.productName
//!     organization_id: { references: organizations.id }
//!   options:
//!     primary_key: id
//!     strategy: returning
//! ```

use super::{FieldSpec, Schema, TableOptions, TableSpec};
use crate::error::SeedError;
use anyhow::{bail, Context};
use serde_yaml_ng::{Mapping, Value as YamlValue};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse schema text (YAML or JSON).
pub fn parse_schema_str(content: &str) -> Result<Schema, SeedError> {
    let root: YamlValue = serde_yaml_ng::from_str(content)
        .map_err(|e| SeedError::Schema(format!("invalid schema document: {}", e)))?;

    let tables = match root {
        YamlValue::Mapping(map) => map,
        YamlValue::Null => Mapping::new(),
        _ => {
            return Err(SeedError::Schema(
                "schema must be a mapping of table name to table definition".to_string(),
            ))
        }
    };

    let mut schema = Schema::new();
    for (key, value) in tables {
        let name = key_to_string(&key)
            .ok_or_else(|| SeedError::Schema("table names must be strings".to_string()))?;
        schema.add_table(parse_table(name, value)?)?;
    }
    Ok(schema)
}

/// Load a single schema file.
pub fn load_schema_file(path: &Path) -> anyhow::Result<Schema> {
    if !path.exists() {
        bail!("Schema file not found: {}", path.display());
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml" | "json") => {}
        _ => bail!(
            "Schema file must be .yaml, .yml or .json: {}",
            path.display()
        ),
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    parse_schema_str(&content)
        .with_context(|| format!("Failed to load schema file {}", path.display()))
}

/// Load and merge several schema files; later files override earlier tables.
pub fn load_schema_files(paths: &[PathBuf]) -> anyhow::Result<Schema> {
    let mut merged = Schema::new();
    for path in paths {
        merged.merge(load_schema_file(path)?);
    }
    if merged.is_empty() {
        bail!("No tables found in schema files.");
    }
    Ok(merged)
}

fn parse_table(name: String, value: YamlValue) -> Result<TableSpec, SeedError> {
    let YamlValue::Mapping(map) = value else {
        return Err(SeedError::Schema(format!(
            "table '{}' must be a mapping with 'count' and 'fields'",
            name
        )));
    };

    let mut count = None;
    let mut table_fields = Mapping::new();
    let mut options = TableOptions::default();

    for (key, value) in map {
        match key_to_string(&key).as_deref() {
            Some("count") => {
                let n = value.as_u64().ok_or_else(|| {
                    SeedError::Schema(format!(
                        "table '{}': 'count' must be a non-negative integer",
                        name
                    ))
                })?;
                count = Some(n as usize);
            }
            Some("fields") => match value {
                YamlValue::Mapping(fields) => table_fields = fields,
                YamlValue::Null => {}
                _ => {
                    return Err(SeedError::Schema(format!(
                        "table '{}': 'fields' must be a mapping",
                        name
                    )))
                }
            },
            Some("options") => {
                options = serde_yaml_ng::from_value(value).map_err(|e| {
                    SeedError::Schema(format!("table '{}': invalid options: {}", name, e))
                })?;
            }
            Some(other) => {
                return Err(SeedError::Schema(format!(
                    "table '{}': unknown key '{}'",
                    name, other
                )))
            }
            None => {
                return Err(SeedError::Schema(format!(
                    "table '{}': keys must be strings",
                    name
                )))
            }
        }
    }

    let count = count
        .ok_or_else(|| SeedError::Schema(format!("table '{}' is missing 'count'", name)))?;

    let mut table = TableSpec::new(name, count).with_options(options);
    for (key, value) in table_fields {
        let field = key_to_string(&key).ok_or_else(|| {
            SeedError::Schema(format!("table '{}': field names must be strings", table.name))
        })?;
        let spec = parse_field(&table.name, &field, value)?;
        table.fields.insert(field, spec);
    }
    Ok(table)
}

/// Classify one field definition into the closed `FieldSpec` variant.
fn parse_field(table: &str, field: &str, value: YamlValue) -> Result<FieldSpec, SeedError> {
    let invalid = |reason: &str| {
        SeedError::Schema(format!(
            "table '{}', field '{}': {}",
            table, field, reason
        ))
    };

    match value {
        YamlValue::String(path) if !path.trim().is_empty() => Ok(FieldSpec::Literal(path)),
        YamlValue::String(_) => Err(invalid("generator path must not be empty")),
        YamlValue::Mapping(map) => {
            if map.len() != 1 {
                return Err(invalid("a reference must have exactly one key, 'references'"));
            }
            match map.get("references") {
                Some(YamlValue::String(target)) => FieldSpec::parse_reference(target)
                    .map_err(|e| invalid(&e.to_string())),
                Some(_) => Err(invalid("'references' must be a 'table.field' string")),
                None => Err(invalid("a reference must have exactly one key, 'references'")),
            }
        }
        _ => Err(invalid(
            "expected a generator path string or { references: table.field }",
        )),
    }
}

fn key_to_string(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_schema() {
        let yaml = r#"
organizations:
  count: 3
projects:
  count: 5
  fields:
    name: commerce.productName
    organization_id: { references: organizations.id }
  options:
    pk: project_id
    strategy: sequential
"#;
        let schema = parse_schema_str(yaml).unwrap();
        assert_eq!(schema.table_names(), vec!["organizations", "projects"]);

        let orgs = schema.get("organizations").unwrap();
        assert_eq!(orgs.count, 3);
        assert!(orgs.fields.is_empty());

        let projects = schema.get("projects").unwrap();
        assert!(matches!(
            projects.fields.get("name"),
            Some(FieldSpec::Literal(p)) if p == "commerce.productName"
        ));
        assert_eq!(
            projects.fields["organization_id"].referenced_table(),
            Some("organizations")
        );
        assert_eq!(projects.options.primary_key(), "project_id");
        assert_eq!(
            projects.options.strategy,
            Some(crate::schema::ReturnStrategy::Sequential)
        );
    }

    #[test]
    fn test_parse_json_schema_keeps_declaration_order() {
        let json = r#"{"zebras": {"count": 1, "fields": {}}, "apples": {"count": 2}}"#;
        let schema = parse_schema_str(json).unwrap();
        assert_eq!(schema.table_names(), vec!["zebras", "apples"]);
    }

    #[test]
    fn test_rejects_unknown_field_shape() {
        let yaml = "users:\n  count: 1\n  fields:\n    age: 42\n";
        let err = parse_schema_str(yaml).unwrap_err().to_string();
        assert!(err.contains("users"));
        assert!(err.contains("age"));
    }

    #[test]
    fn test_rejects_mapping_without_references() {
        let yaml = "users:\n  count: 1\n  fields:\n    org: { table: orgs }\n";
        assert!(parse_schema_str(yaml).is_err());
    }

    #[test]
    fn test_rejects_missing_or_negative_count() {
        assert!(parse_schema_str("users:\n  fields: {}\n").is_err());
        assert!(parse_schema_str("users:\n  count: -1\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_table_key() {
        let err = parse_schema_str("users:\n  count: 1\n  rows: 3\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("rows"));
    }
}
