//! Command-line tests run against the built binary.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = "
comments:
  count: 6
  fields:
    body: lorem.sentence
    post_id: { references: posts.id }
posts:
  count: 4
  fields:
    title: lorem.sentence
    author_id: { references: users.id }
users:
  count: 2
  fields:
    email: internet.email
";

fn quick_seed_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_quick-seed"))
}

fn write_schema(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("schema.yaml");
    fs::write(&path, content).unwrap();
    path
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "Command failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

mod seed_tests {
    use super::*;

    #[test]
    fn test_seed_memory_json() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(dir.path(), SCHEMA);

        let output = quick_seed_bin()
            .current_dir(dir.path())
            .args(["seed", "--adapter", "memory", "--seed", "1", "--json"])
            .arg(&schema)
            .output()
            .unwrap();

        let json = stdout_json(&output);
        assert_eq!(json["order"], serde_json::json!(["users", "posts", "comments"]));
        assert_eq!(json["total_records"], 12);
        assert_eq!(json["tables"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_seed_sql_script() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(dir.path(), SCHEMA);
        let out = dir.path().join("out.sql");

        let output = quick_seed_bin()
            .args(["seed", "--adapter", "sql", "--dialect", "mysql", "--connection"])
            .arg(&out)
            .arg(&schema)
            .output()
            .unwrap();

        assert!(output.status.success());
        let script = fs::read_to_string(&out).unwrap();
        assert!(script.contains("INSERT INTO `comments`"));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Records inserted: 12"));
    }

    #[test]
    fn test_seed_duckdb_with_setup() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(
            dir.path(),
            "people:\n  count: 5\n  fields:\n    name: person.fullName\n",
        );
        let setup = dir.path().join("setup.sql");
        fs::write(
            &setup,
            "CREATE SEQUENCE people_seq; CREATE TABLE people (id BIGINT PRIMARY KEY DEFAULT nextval('people_seq'), name TEXT);",
        )
        .unwrap();

        let output = quick_seed_bin()
            .args(["seed", "--adapter", "duckdb", "--json", "--setup"])
            .arg(&setup)
            .arg(&schema)
            .output()
            .unwrap();

        let json = stdout_json(&output);
        assert_eq!(json["tables"][0]["inserted"], 5);
    }

    #[test]
    fn test_seed_cycle_exits_with_error() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(
            dir.path(),
            "a:\n  count: 1\n  fields:\n    b_id: { references: b.id }\nb:\n  count: 1\n  fields:\n    a_id: { references: a.id }\n",
        );

        let output = quick_seed_bin()
            .args(["seed", "--adapter", "memory"])
            .arg(&schema)
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Circular dependency detected involving tables: a, b"));
    }

    #[test]
    fn test_seed_without_schema_fails() {
        let dir = TempDir::new().unwrap();
        let output = quick_seed_bin()
            .current_dir(dir.path())
            .arg("seed")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("No schema files given"));
    }

    #[test]
    fn test_unknown_adapter_rejected() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(dir.path(), SCHEMA);
        let output = quick_seed_bin()
            .args(["seed", "--adapter", "oracle"])
            .arg(&schema)
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown adapter: oracle"));
    }
}

mod init_tests {
    use super::*;

    #[test]
    fn test_init_then_seed_from_config() {
        let dir = TempDir::new().unwrap();

        let init = quick_seed_bin()
            .args(["init", "--adapter", "memory"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(init.status.success());
        assert!(dir.path().join("quick-seed.yaml").exists());
        assert!(dir.path().join("schema.yaml").exists());

        let seed = quick_seed_bin()
            .current_dir(dir.path())
            .args(["seed", "--json"])
            .output()
            .unwrap();
        let json = stdout_json(&seed);
        assert_eq!(json["order"], serde_json::json!(["users", "posts"]));
        assert_eq!(json["total_records"], 35);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.yaml"), "keep: me\n").unwrap();

        let output = quick_seed_bin().arg("init").arg(dir.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert_eq!(
            fs::read_to_string(dir.path().join("schema.yaml")).unwrap(),
            "keep: me\n"
        );

        let forced = quick_seed_bin()
            .args(["init", "--force"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(forced.status.success());
    }
}

mod inspect_tests {
    use super::*;

    #[test]
    fn test_order_text() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(dir.path(), SCHEMA);

        let output = quick_seed_bin().arg("order").arg(&schema).output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1. users (2 records)"));
        assert!(stdout.contains("3. comments (6 records) ← posts"));
    }

    #[test]
    fn test_order_json_marks_self_reference() {
        let dir = TempDir::new().unwrap();
        let schema = write_schema(
            dir.path(),
            "employees:\n  count: 3\n  fields:\n    manager_id: { references: employees.id }\n",
        );

        let output = quick_seed_bin()
            .args(["order", "--json"])
            .arg(&schema)
            .output()
            .unwrap();
        let json = stdout_json(&output);
        assert_eq!(json["tables"][0]["self_referencing"], true);
        assert_eq!(json["roots"], serde_json::json!(["employees"]));
    }

    #[test]
    fn test_generators_namespace_filter() {
        let output = quick_seed_bin()
            .args(["generators", "--namespace", "person", "--json"])
            .output()
            .unwrap();
        let json = stdout_json(&output);
        let namespaces = json["namespaces"].as_object().unwrap();
        assert_eq!(namespaces.len(), 1);
        assert!(namespaces["person"]
            .as_array()
            .unwrap()
            .contains(&Value::from("person.fullName")));
    }

    #[test]
    fn test_generators_unknown_namespace() {
        let output = quick_seed_bin()
            .args(["generators", "--namespace", "weather"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown namespace: weather"));
    }

    #[test]
    fn test_schema_output_dir() {
        let dir = TempDir::new().unwrap();
        let output = quick_seed_bin()
            .args(["schema", "--output-dir"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        for name in ["generators", "order", "seed"] {
            let path = dir.path().join(format!("{}.schema.json", name));
            let schema: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            assert!(schema.is_object());
        }
    }

    #[test]
    fn test_completions() {
        let output = quick_seed_bin().args(["completions", "bash"]).output().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("quick-seed"));
    }
}
