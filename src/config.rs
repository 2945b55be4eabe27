//! Run configuration loaded from `quick-seed.yaml`.
//!
//! Every setting can also be given on the command line; flags win over the
//! file.

use crate::adapter::{AdapterKind, SqlDialect};
use crate::schema::ReturnStrategy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "quick-seed.yaml";

/// Complete YAML configuration for the seed command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedYamlConfig {
    /// Storage adapter to seed through
    pub adapter: Option<AdapterKind>,
    /// Adapter target: database path, `:memory:` or output file
    pub connection: Option<String>,
    /// Schema files, merged in order
    pub schemas: Vec<PathBuf>,
    /// SQL file run after connecting (DuckDB)
    pub setup: Option<PathBuf>,
    /// Output dialect for the sql adapter
    pub dialect: Option<SqlDialect>,
    /// Default return strategy for tables without one
    pub strategy: Option<ReturnStrategy>,
    /// RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl SeedYamlConfig {
    /// Load configuration from a YAML file.
    ///
    /// Relative schema and setup paths are resolved against the file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: SeedYamlConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Load `path` if given, else the default file if it exists
    pub fn discover(path: Option<&Path>) -> anyhow::Result<Option<Self>> {
        match path {
            Some(path) => Self::load(path).map(Some),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for schema in &mut self.schemas {
            if schema.is_relative() {
                *schema = base.join(&*schema);
            }
        }
        if let Some(setup) = self.setup.as_mut() {
            if setup.is_relative() {
                *setup = base.join(&*setup);
            }
        }
    }
}

/// Starter config written by `quick-seed init`
pub fn config_template(adapter: AdapterKind, schema: &str) -> String {
    let connection = match adapter {
        AdapterKind::Memory => ":memory:",
        AdapterKind::DuckDb => "seed.duckdb",
        AdapterKind::Sql => "seed.sql",
    };
    format!(
        "# quick-seed configuration\n\
         adapter: {adapter}\n\
         connection: \"{connection}\"\n\
         schemas:\n  - {schema}\n\
         # setup: schema.sql        # SQL run after connecting (duckdb)\n\
         # dialect: postgres        # mysql, postgres or sqlite (sql adapter)\n\
         # strategy: returning      # returning, sequential or lookup (duckdb)\n\
         # seed: 42\n"
    )
}

/// Starter schema written by `quick-seed init`
pub const SCHEMA_TEMPLATE: &str = "\
# Tables are seeded parents first; declaration order breaks ties.
users:
  count: 10
  fields:
    name: person.fullName
    email: internet.email
posts:
  count: 25
  fields:
    title: lorem.sentence
    body: lorem.paragraph
    author_id: { references: users.id }
";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quick-seed.yaml");
        fs::write(
            &path,
            "adapter: duckdb\nconnection: app.duckdb\nschemas: [seed/schema.yaml, /abs/other.yaml]\nsetup: setup.sql\nseed: 7\n",
        )
        .unwrap();

        let config = SeedYamlConfig::load(&path).unwrap();
        assert_eq!(config.adapter, Some(AdapterKind::DuckDb));
        assert_eq!(config.schemas[0], dir.path().join("seed/schema.yaml"));
        assert_eq!(config.schemas[1], PathBuf::from("/abs/other.yaml"));
        assert_eq!(config.setup, Some(dir.path().join("setup.sql")));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quick-seed.yaml");
        fs::write(&path, "adaptor: duckdb\n").unwrap();
        assert!(SeedYamlConfig::load(&path).is_err());
    }

    #[test]
    fn test_template_round_trips() {
        let config: SeedYamlConfig =
            serde_yaml_ng::from_str(&config_template(AdapterKind::Sql, "schema.yaml")).unwrap();
        assert_eq!(config.adapter, Some(AdapterKind::Sql));
        assert_eq!(config.connection.as_deref(), Some("seed.sql"));
        assert_eq!(config.schemas, vec![PathBuf::from("schema.yaml")]);

        let schema = crate::schema::parse_schema_str(SCHEMA_TEMPLATE).unwrap();
        assert_eq!(schema.table_names(), vec!["users", "posts"]);
    }
}
