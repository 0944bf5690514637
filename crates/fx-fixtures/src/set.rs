//! The fixture set: discovery, injection, baking, application and lookup.
//!
//! A set moves through `Unbuilt -> Loaded -> Baked -> Applied`. Rows can be
//! injected with [`FixtureSet::add_fixture`] only while `Loaded`; once baked
//! the compiled statements and the id index are frozen for the run. To pick
//! up changed files, build a new set.

use crate::compiler::CompiledTable;
use crate::definition::{FixtureDefinition, RowContext};
use crate::error::{FixtureError, FixtureResult};
use crate::order::TableOrder;
use crate::row::{Attributes, FixtureRow};
use chrono::{NaiveDateTime, Utc};
use fx_core::{
    discover_fixture_files, ColumnCatalog, Config, Identifier, ModelProvider, ModelRegistry,
};
use fx_db::{Database, Quoting};
use fx_jinja::JinjaEnvironment;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Lifecycle state of a [`FixtureSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureSetState {
    Unbuilt,
    Loaded,
    Baked,
    Applied,
}

impl std::fmt::Display for FixtureSetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureSetState::Unbuilt => write!(f, "unbuilt"),
            FixtureSetState::Loaded => write!(f, "loaded"),
            FixtureSetState::Baked => write!(f, "baked"),
            FixtureSetState::Applied => write!(f, "applied"),
        }
    }
}

/// Runtime options for a fixture set.
#[derive(Debug, Clone)]
pub struct FixtureOptions {
    /// Search roots, checked in order
    pub paths: Vec<PathBuf>,
    pub clear_other_tables: bool,
    pub tables_excluded_from_clearing: Vec<String>,
    /// Log progress at info level
    pub trace: bool,
    /// Variables exposed to templates through `var()`
    pub vars: HashMap<String, serde_yaml::Value>,
}

impl FixtureOptions {
    /// Options with configuration defaults for the given search roots.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            paths,
            clear_other_tables: defaults.clear_other_tables,
            tables_excluded_from_clearing: defaults.tables_excluded_from_clearing,
            trace: defaults.trace,
            vars: defaults.vars,
        }
    }

    /// Options from a project config, resolving paths against `root`.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self {
            paths: config.paths_absolute(root),
            clear_other_tables: config.clear_other_tables,
            tables_excluded_from_clearing: config.tables_excluded_from_clearing.clone(),
            trace: config.trace,
            vars: config.vars.clone(),
        }
    }

    fn is_excluded_from_clearing(&self, table: &str) -> bool {
        self.tables_excluded_from_clearing.iter().any(|t| t == table)
    }
}

/// All fixtures of one run.
pub struct FixtureSet {
    options: FixtureOptions,
    models: Box<dyn ModelProvider + Send + Sync>,
    loaded_at: NaiveDateTime,
    jinja: JinjaEnvironment<'static>,
    state: FixtureSetState,
    definitions: IndexMap<String, FixtureDefinition>,
    columns: HashMap<String, ColumnCatalog>,
    tables: BTreeMap<String, CompiledTable>,
    id_index: BTreeMap<String, IndexMap<String, Identifier>>,
    needs_reapply: bool,
}

impl FixtureSet {
    /// Create an unbuilt set. The run instant is captured here and shared by
    /// every file and row.
    pub fn new(options: FixtureOptions, models: impl ModelProvider + Send + Sync + 'static) -> Self {
        let loaded_at = Utc::now().naive_utc();
        Self {
            jinja: JinjaEnvironment::new(&options.vars, loaded_at),
            options,
            models: Box::new(models),
            loaded_at,
            state: FixtureSetState::Unbuilt,
            definitions: IndexMap::new(),
            columns: HashMap::new(),
            tables: BTreeMap::new(),
            id_index: BTreeMap::new(),
            needs_reapply: false,
        }
    }

    /// Create a set from a project config, using its `models:` section.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(FixtureOptions::from_config(config, root), config.model_registry())
    }

    /// Create a set with an empty model registry.
    pub fn without_models(options: FixtureOptions) -> Self {
        Self::new(options, ModelRegistry::new())
    }

    /// Pin the run instant.
    pub fn with_loaded_at(mut self, loaded_at: NaiveDateTime) -> Self {
        self.loaded_at = loaded_at;
        self.jinja = JinjaEnvironment::new(&self.options.vars, loaded_at);
        self
    }

    pub fn state(&self) -> FixtureSetState {
        self.state
    }

    pub fn loaded_at(&self) -> NaiveDateTime {
        self.loaded_at
    }

    pub fn options(&self) -> &FixtureOptions {
        &self.options
    }

    /// Discover every definition file and read the target tables' columns.
    pub async fn load(&mut self, db: &dyn Database) -> FixtureResult<()> {
        if self.state != FixtureSetState::Unbuilt {
            return Err(FixtureError::InvalidState {
                operation: "load",
                expected: "unbuilt",
                actual: self.state,
            });
        }

        for file in discover_fixture_files(&self.options.paths)? {
            let name = file.name.to_string();
            if self.definitions.contains_key(&name) {
                continue;
            }

            let model = match self.models.model_for(&name) {
                Ok(model) => Some(model),
                Err(e) => {
                    log::warn!("{}, loading '{}' from column metadata only", e, name);
                    None
                }
            };
            let definition = FixtureDefinition::new(file, model);

            let table = definition.table_name().to_string();
            if !self.columns.contains_key(&table) {
                let columns = db.columns(&table).await?;
                if columns.is_empty() {
                    log::warn!("Table '{}' for fixture '{}' not found", table, name);
                }
                self.columns.insert(table, columns.into_iter().collect());
            }

            self.definitions.insert(name, definition);
        }

        log::debug!("Loaded {} fixture definitions", self.definitions.len());
        self.state = FixtureSetState::Loaded;
        Ok(())
    }

    /// Inject a row into a loaded definition and embellish it immediately.
    pub fn add_fixture(
        &mut self,
        fixture: &str,
        label: &str,
        attributes: Attributes,
    ) -> FixtureResult<&FixtureRow> {
        match self.state {
            FixtureSetState::Loaded => {}
            FixtureSetState::Baked | FixtureSetState::Applied => {
                return Err(FixtureError::AlreadyBaked {
                    fixture: fixture.to_string(),
                    label: label.to_string(),
                })
            }
            FixtureSetState::Unbuilt => {
                return Err(FixtureError::InvalidState {
                    operation: "add_fixture",
                    expected: "loaded",
                    actual: self.state,
                })
            }
        }

        let definition =
            self.definitions
                .get_mut(fixture)
                .ok_or_else(|| FixtureError::UnknownFixture {
                    fixture: fixture.to_string(),
                })?;
        let empty = ColumnCatalog::default();
        let ctx = RowContext {
            jinja: &self.jinja,
            models: self.models.as_ref(),
            columns: self.columns.get(definition.table_name()).unwrap_or(&empty),
            loaded_at: self.loaded_at,
        };
        definition.add_row(label, attributes, &ctx)
    }

    /// Embellish every definition and compile every table.
    ///
    /// Definitions sharing a table are compiled together. Nothing is kept if
    /// any table fails.
    pub fn bake<Q: Quoting + ?Sized>(&mut self, quoting: &Q) -> FixtureResult<()> {
        match self.state {
            FixtureSetState::Loaded => {}
            FixtureSetState::Baked | FixtureSetState::Applied => return Ok(()),
            FixtureSetState::Unbuilt => {
                return Err(FixtureError::InvalidState {
                    operation: "bake",
                    expected: "loaded",
                    actual: self.state,
                })
            }
        }

        let empty = ColumnCatalog::default();
        let mut grouped: BTreeMap<String, Vec<FixtureRow>> = BTreeMap::new();
        let mut id_index = BTreeMap::new();

        for (name, definition) in self.definitions.iter_mut() {
            let ctx = RowContext {
                jinja: &self.jinja,
                models: self.models.as_ref(),
                columns: self.columns.get(definition.table_name()).unwrap_or(&empty),
                loaded_at: self.loaded_at,
            };
            definition.ensure_embellished(&ctx)?;

            grouped
                .entry(definition.table_name().to_string())
                .or_default()
                .extend(definition.rows().cloned());
            id_index.insert(name.clone(), definition.fixture_ids());
        }

        let mut tables = BTreeMap::new();
        for (table, rows) in grouped {
            let columns = self.columns.get(&table).unwrap_or(&empty);
            let compiled = CompiledTable::compile(&table, rows, columns, quoting)?;
            tables.insert(table, compiled);
        }

        self.tables = tables;
        self.id_index = id_index;
        self.state = FixtureSetState::Baked;
        Ok(())
    }

    /// Load and bake, if not done yet.
    pub async fn build(&mut self, db: &dyn Database) -> FixtureResult<()> {
        if matches!(
            self.state,
            FixtureSetState::Baked | FixtureSetState::Applied
        ) {
            return Ok(());
        }

        if self.options.trace {
            log::info!("building fixtures");
        }
        if self.state == FixtureSetState::Unbuilt {
            self.load(db).await?;
        }
        self.bake(db)?;
        if self.options.trace {
            log::info!("built fixtures for {} tables", self.tables.len());
        }
        Ok(())
    }

    /// Build if needed, then replace the contents of every fixture table in
    /// one transaction with referential integrity suspended. Tables are
    /// written in foreign key order for backends that cannot suspend it.
    ///
    /// On failure the transaction is rolled back and the set keeps its
    /// previous state.
    pub async fn apply(&mut self, db: &dyn Database) -> FixtureResult<()> {
        self.build(db).await?;

        if self.options.trace {
            log::info!("applying fixtures");
        }
        db.disable_referential_integrity().await?;
        let result = self.apply_in_transaction(db).await;
        let reenabled = db.enable_referential_integrity().await;
        result?;
        reenabled?;

        self.state = FixtureSetState::Applied;
        if self.options.trace {
            log::info!("applied fixtures");
        }
        Ok(())
    }

    /// Apply once per process for transactional tests.
    ///
    /// A transactional caller reuses a previous application; a
    /// non-transactional one always re-applies and forces the next caller to
    /// do the same, since its writes were not rolled back. Returns whether
    /// the fixtures were applied.
    pub async fn ensure_applied(
        &mut self,
        db: &dyn Database,
        transactional: bool,
    ) -> FixtureResult<bool> {
        if transactional && self.state == FixtureSetState::Applied && !self.needs_reapply {
            return Ok(false);
        }
        self.apply(db).await?;
        self.needs_reapply = !transactional;
        Ok(true)
    }

    async fn apply_in_transaction(&self, db: &dyn Database) -> FixtureResult<()> {
        db.begin_transaction().await?;
        match self.write_all(db).await {
            Ok(()) => {
                db.commit().await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = db.rollback().await {
                    log::error!("Rollback after failed apply also failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    async fn write_all(&self, db: &dyn Database) -> FixtureResult<()> {
        let cleared = if self.options.clear_other_tables {
            self.tables_to_clear(db).await?
        } else {
            Vec::new()
        };
        self.write_tables(db, &cleared).await?;
        Ok(())
    }

    /// Execute the baked statements without transaction control, for callers
    /// that manage their own transaction. Returns the number executed.
    pub async fn apply_statements(&self, db: &dyn Database) -> FixtureResult<usize> {
        self.require_baked("apply_statements")?;
        self.write_tables(db, &[]).await
    }

    /// Delete every row from tables without fixtures, except excluded ones.
    /// Returns the cleared tables.
    pub async fn clear_other_tables(&self, db: &dyn Database) -> FixtureResult<Vec<String>> {
        self.require_baked("clear_other_tables")?;
        let cleared = self.tables_to_clear(db).await?;
        let foreign_keys = db.foreign_keys().await?;
        let order = TableOrder::build(cleared.iter().map(String::as_str), &foreign_keys)
            .insert_order()?;
        for table in order.iter().rev() {
            db.execute(&format!("DELETE FROM {}", db.quote_identifier(table)))
                .await?;
        }
        Ok(cleared)
    }

    async fn tables_to_clear(&self, db: &dyn Database) -> FixtureResult<Vec<String>> {
        Ok(db
            .list_tables()
            .await?
            .into_iter()
            .filter(|table| {
                !self.tables.contains_key(table) && !self.options.is_excluded_from_clearing(table)
            })
            .collect())
    }

    /// Run every delete with referencing tables first, then every insert
    /// with referenced tables first.
    async fn write_tables(&self, db: &dyn Database, cleared: &[String]) -> FixtureResult<usize> {
        let foreign_keys = db.foreign_keys().await?;
        let order = TableOrder::build(
            self.tables
                .keys()
                .chain(cleared.iter())
                .map(String::as_str),
            &foreign_keys,
        )
        .insert_order()?;

        let mut executed = 0;
        for table in order.iter().rev() {
            let sql = match self.tables.get(table) {
                Some(compiled) => compiled.delete_statement().to_string(),
                None => format!("DELETE FROM {}", db.quote_identifier(table)),
            };
            db.execute(&sql).await?;
            executed += 1;
        }

        for table in &order {
            let Some(compiled) = self.tables.get(table) else {
                continue;
            };
            for statement in compiled.insert_statements() {
                db.execute(statement).await?;
                executed += 1;
            }
            log::debug!("Applied {} rows to {}", compiled.row_count(), table);
        }

        if !cleared.is_empty() {
            log::debug!("Cleared tables without fixtures: {}", cleared.join(", "));
        }
        Ok(executed)
    }

    /// Identifier of a labelled row.
    pub fn lookup(&self, fixture: &str, label: &str) -> FixtureResult<&Identifier> {
        self.identifiers(fixture)?
            .get(label)
            .ok_or_else(|| FixtureError::Lookup {
                fixture: fixture.to_string(),
                label: label.to_string(),
            })
    }

    /// Every label of a fixture with its identifier, in file order.
    pub fn identifiers(&self, fixture: &str) -> FixtureResult<&IndexMap<String, Identifier>> {
        self.require_baked("lookup")?;
        self.id_index
            .get(fixture)
            .ok_or_else(|| FixtureError::UnknownFixture {
                fixture: fixture.to_string(),
            })
    }

    pub fn definition(&self, fixture: &str) -> Option<&FixtureDefinition> {
        self.definitions.get(fixture)
    }

    /// Definitions in discovery order.
    pub fn definitions(&self) -> impl Iterator<Item = &FixtureDefinition> {
        self.definitions.values()
    }

    pub fn fixture_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Compiled tables by name.
    pub fn tables(&self) -> impl Iterator<Item = &CompiledTable> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&CompiledTable> {
        self.tables.get(name)
    }

    /// Every baked statement, grouped by table name.
    pub fn statements(&self) -> FixtureResult<Vec<&str>> {
        self.require_baked("statements")?;
        Ok(self
            .tables
            .values()
            .flat_map(|t| t.statements.iter().map(String::as_str))
            .collect())
    }

    fn require_baked(&self, operation: &'static str) -> FixtureResult<()> {
        match self.state {
            FixtureSetState::Baked | FixtureSetState::Applied => Ok(()),
            actual => Err(FixtureError::NotBaked { operation, actual }),
        }
    }
}

impl std::fmt::Debug for FixtureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureSet")
            .field("state", &self.state)
            .field("loaded_at", &self.loaded_at)
            .field("fixtures", &self.definitions.keys().collect::<Vec<_>>())
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "set_test.rs"]
mod tests;
