//! Seeding through the embedded DuckDB adapter.

use duckdb::Connection;
use quick_seed::adapter::{ConnectionConfig, DuckDbAdapter};
use quick_seed::schema::{parse_schema_str, ReturnStrategy};
use quick_seed::seeder::Seeder;
use tempfile::TempDir;

const SETUP: &str = "
    CREATE SEQUENCE IF NOT EXISTS org_seq START 1;
    CREATE SEQUENCE IF NOT EXISTS project_seq START 1;
    CREATE TABLE IF NOT EXISTS organizations (
        id BIGINT PRIMARY KEY DEFAULT nextval('org_seq'),
        name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS projects (
        id BIGINT PRIMARY KEY DEFAULT nextval('project_seq'),
        name TEXT NOT NULL,
        organization_id BIGINT NOT NULL REFERENCES organizations(id)
    );
";

const SCHEMA: &str = "
projects:
  count: 12
  fields:
    name: commerce.productName
    organization_id: { references: organizations.id }
organizations:
  count: 3
  fields:
    name: company.name
";

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn seed_file_db(strategy: ReturnStrategy, runs: usize) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seed.duckdb");
    let schema = parse_schema_str(SCHEMA).unwrap();
    let config = ConnectionConfig::new(db.to_string_lossy());

    for run in 0..runs {
        let adapter = DuckDbAdapter::new()
            .with_setup_sql(SETUP)
            .with_table_options(schema.table_options())
            .with_default_strategy(strategy);
        let mut seeder = Seeder::new(adapter).with_seed(run as u64);
        let summary = seeder.seed(&schema, &config).unwrap();
        assert_eq!(summary.order, vec!["organizations", "projects"]);
        assert_eq!(summary.total_records, 15);
    }
    (dir, db)
}

mod strategy_tests {
    use super::*;

    fn assert_foreign_keys_hold(db: &std::path::Path, orgs: i64, projects: i64) {
        let conn = Connection::open(db).unwrap();
        assert_eq!(count(&conn, "SELECT count(*) FROM organizations"), orgs);
        assert_eq!(count(&conn, "SELECT count(*) FROM projects"), projects);
        assert_eq!(
            count(
                &conn,
                "SELECT count(*) FROM projects p LEFT JOIN organizations o \
                 ON p.organization_id = o.id WHERE o.id IS NULL"
            ),
            0
        );
    }

    #[test]
    fn test_returning_strategy() {
        let (_dir, db) = seed_file_db(ReturnStrategy::Returning, 1);
        assert_foreign_keys_hold(&db, 3, 12);
    }

    #[test]
    fn test_sequential_strategy_across_runs() {
        let (_dir, db) = seed_file_db(ReturnStrategy::Sequential, 2);
        assert_foreign_keys_hold(&db, 6, 24);
    }

    #[test]
    fn test_lookup_strategy_across_runs() {
        let (_dir, db) = seed_file_db(ReturnStrategy::Lookup, 2);
        assert_foreign_keys_hold(&db, 6, 24);
    }

    #[test]
    fn test_second_run_references_only_its_own_parents() {
        let (_dir, db) = seed_file_db(ReturnStrategy::Sequential, 2);
        let conn = Connection::open(db).unwrap();

        // Organizations 4..=6 belong to the second run
        assert_eq!(
            count(
                &conn,
                "SELECT count(*) FROM projects WHERE id > 12 AND organization_id <= 3"
            ),
            0
        );
    }
}

mod option_tests {
    use super::*;

    #[test]
    fn test_table_options_pick_strategy_and_key() {
        let schema = parse_schema_str(
            "
events:
  count: 4
  fields:
    title: lorem.sentence
  options:
    primary_key: event_id
    strategy: sequential
",
        )
        .unwrap();
        let setup = "
            CREATE SEQUENCE event_seq START 100;
            CREATE TABLE events (event_id BIGINT PRIMARY KEY DEFAULT nextval('event_seq'), title TEXT);
        ";

        let dir = TempDir::new().unwrap();
        let db = dir.path().join("events.duckdb");

        let adapter = DuckDbAdapter::new()
            .with_setup_sql(setup)
            .with_table_options(schema.table_options());
        let mut seeder = Seeder::new(adapter);
        let summary = seeder
            .seed(&schema, &ConnectionConfig::new(db.to_string_lossy()))
            .unwrap();
        assert_eq!(summary.tables[0].inserted, 4);
        assert!(seeder.adapter().connection().is_none());

        let conn = Connection::open(&db).unwrap();
        assert_eq!(count(&conn, "SELECT min(event_id) FROM events"), 100);
        assert_eq!(count(&conn, "SELECT count(*) FROM events"), 4);
    }

    #[test]
    fn test_missing_table_fails_the_run() {
        let schema = parse_schema_str("ghosts:\n  count: 1\n  fields:\n    name: person.firstName\n")
            .unwrap();
        let mut seeder = Seeder::new(DuckDbAdapter::new());
        let err = seeder
            .seed(&schema, &ConnectionConfig::in_memory())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("ghosts"));
    }
}
