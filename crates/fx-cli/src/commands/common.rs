//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use fx_core::{Config, CoreError};
use fx_db::{Database, DbError, DuckDbBackend};
use fx_fixtures::{FixtureError, FixtureSet};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Exit code for malformed fixtures or templates
pub(crate) const EXIT_FORMAT_ERROR: i32 = 2;

/// Exit code for database failures
pub(crate) const EXIT_DATABASE_ERROR: i32 = 4;

/// Map an error chain to the process exit code.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(fixture_err) = cause.downcast_ref::<FixtureError>() {
            if fixture_err.is_format_error() {
                return EXIT_FORMAT_ERROR;
            }
            if matches!(fixture_err, FixtureError::Db(_)) {
                return EXIT_DATABASE_ERROR;
            }
        }
        if cause.downcast_ref::<DbError>().is_some() {
            return EXIT_DATABASE_ERROR;
        }
    }
    1
}

/// Install the logger once; `verbose` raises the default level to info.
pub(crate) fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// A fixtures project: its root directory and configuration.
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

/// Load the project config (`--config` or `fixtures.yml` in the project dir).
///
/// A project without a config file runs on defaults.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)).context("Failed to load config")?,
        None => match Config::load_from_dir(&root) {
            Ok(config) => config,
            Err(CoreError::ConfigNotFound { path }) => {
                log::debug!("No config at {}, using defaults", path);
                Config::default()
            }
            Err(e) => return Err(e).context("Failed to load fixtures.yml"),
        },
    };

    init_logging(global.verbose || config.trace);
    Ok(Project { root, config })
}

/// Open the configured database (CLI flag > FX_DATABASE > config).
pub(crate) fn connect(project: &Project, global: &GlobalArgs) -> Result<DuckDbBackend> {
    let path = project
        .config
        .resolve_database_path(global.database.as_deref());
    log::debug!("Connecting to {}", path);
    DuckDbBackend::new(&path).with_context(|| format!("Failed to connect to database: {}", path))
}

/// Run a schema SQL file, if one was given.
pub(crate) async fn run_schema_file(db: &dyn Database, schema: Option<&str>) -> Result<()> {
    let Some(path) = schema else {
        return Ok(());
    };
    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path))?;
    db.execute_batch(&sql)
        .await
        .with_context(|| format!("Failed to execute schema file: {}", path))?;
    Ok(())
}

/// Load and bake every fixture of the project.
pub(crate) async fn build_fixture_set(project: &Project, db: &dyn Database) -> Result<FixtureSet> {
    let mut set = FixtureSet::from_config(&project.config, &project.root);
    set.build(db).await.context("Failed to build fixtures")?;
    Ok(set)
}
