//! Configuration types and parsing for fixtures.yml

use crate::error::{CoreError, CoreResult};
use crate::model::{ModelConfig, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding `database.path`
pub const DATABASE_ENV_VAR: &str = "FX_DATABASE";

/// Project configuration from fixtures.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fixture search roots, checked in order
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    /// Delete rows from every table without a fixture file when applying
    #[serde(default)]
    pub clear_other_tables: bool,

    /// Tables never cleared by `clear_other_tables`
    #[serde(default = "default_tables_excluded_from_clearing")]
    pub tables_excluded_from_clearing: Vec<String>,

    /// Log build/apply progress
    #[serde(default)]
    pub trace: bool,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Variables available to fixture templates through `var()`
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,

    /// Model semantics per fixture name
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_paths() -> Vec<String> {
    vec!["test/fixtures".to_string(), "spec/fixtures".to_string()]
}

fn default_tables_excluded_from_clearing() -> Vec<String> {
    vec!["schema_migrations".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            clear_other_tables: false,
            tables_excluded_from_clearing: default_tables_excluded_from_clearing(),
            trace: false,
            database: DatabaseConfig::default(),
            vars: HashMap::new(),
            models: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        // An empty file means "all defaults"
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for fixtures.yml or fixtures.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        if !dir.is_dir() {
            return Err(CoreError::ProjectNotFound {
                path: dir.display().to_string(),
            });
        }

        let yml_path = dir.join("fixtures.yml");
        let yaml_path = dir.join("fixtures.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one fixture path must be specified".to_string(),
            });
        }

        if let Some(p) = self.paths.iter().find(|p| p.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!("Fixture path '{}' is empty", p),
            });
        }

        for (name, model) in &self.models {
            if name.is_empty() || name.contains('/') {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "Model key '{}' must be a fixture name (path separators replaced by '_')",
                        name
                    ),
                });
            }
            for association in &model.associations {
                if association.polymorphic
                    && association.kind != crate::model::AssociationKind::BelongsTo
                {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "Association '{}' on model '{}' is polymorphic but has kind {}",
                            association.name, name, association.kind
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get absolute fixture search paths relative to a project root
    pub fn paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.paths.iter().map(|p| root.join(p)).collect()
    }

    /// Build the model registry from the `models:` section
    pub fn model_registry(&self) -> ModelRegistry {
        ModelRegistry::from_config(&self.models)
    }

    /// Resolve the database path
    ///
    /// Priority: CLI flag > FX_DATABASE env var > config
    pub fn resolve_database_path(&self, cli_path: Option<&str>) -> String {
        cli_path
            .map(String::from)
            .or_else(|| std::env::var(DATABASE_ENV_VAR).ok())
            .unwrap_or_else(|| self.database.path.clone())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
