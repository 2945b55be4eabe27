//! Integration tests that verify --json output matches the published JSON schemas.

use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn quick_seed_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_quick-seed"))
}

fn load_schema(name: &str) -> Validator {
    let schema = quick_seed::json_schema::get_schema(name)
        .unwrap_or_else(|| panic!("No schema for {}", name));
    let schema = serde_json::to_value(schema).expect("Schema is not JSON");
    Validator::new(&schema).expect("Failed to compile schema")
}

fn validate_json_output(output: &Output, schema_name: &str) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Command failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Invalid JSON output: {}\nOutput: {}", e, stdout));

    if let Err(error) = load_schema(schema_name).validate(&json) {
        panic!(
            "JSON output doesn't match {} schema:\n  - {}: {}\n\nOutput was:\n{}",
            schema_name,
            error.instance_path(),
            error,
            serde_json::to_string_pretty(&json).unwrap()
        );
    }
}

fn schema_file(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.yaml"), content).unwrap();
    dir
}

const SCHEMA: &str = "
users:
  count: 3
  fields:
    name: person.fullName
posts:
  count: 0
  fields:
    author_id: { references: users.id }
tags:
  count: 2
  fields:
    parent_id: { references: tags.id }
";

#[test]
fn test_seed_json_matches_schema() {
    let dir = schema_file(SCHEMA);
    let output = quick_seed_bin()
        .args(["seed", "--adapter", "memory", "--json"])
        .arg(dir.path().join("schema.yaml"))
        .output()
        .unwrap();
    validate_json_output(&output, "seed");
}

#[test]
fn test_order_json_matches_schema() {
    let dir = schema_file(SCHEMA);
    let output = quick_seed_bin()
        .args(["order", "--json"])
        .arg(dir.path().join("schema.yaml"))
        .output()
        .unwrap();
    validate_json_output(&output, "order");
}

#[test]
fn test_generators_json_matches_schema() {
    let output = quick_seed_bin()
        .args(["generators", "--json"])
        .output()
        .unwrap();
    validate_json_output(&output, "generators");
}

#[test]
fn test_schema_command_matches_library() {
    let output = quick_seed_bin().args(["schema", "seed"]).output().unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let expected = serde_json::to_value(quick_seed::json_schema::get_schema("seed").unwrap()).unwrap();
    assert_eq!(printed, expected);
}

#[test]
fn test_schema_names() {
    assert_eq!(
        quick_seed::json_schema::schema_names(),
        vec!["generators", "order", "seed"]
    );
    assert!(quick_seed::json_schema::get_schema("split").is_none());
}
