//! Error types for fx-fixtures

use crate::set::FixtureSetState;
use fx_core::{AssociationKind, CoreError};
use fx_db::DbError;
use fx_jinja::JinjaError;
use thiserror::Error;

/// Malformed fixture content.
///
/// Always fatal to compiling the file it came from. Messages keep the
/// wording long-standing fixture tooling uses, so callers matching on them
/// keep working.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The expanded file is not valid YAML
    #[error("a YAML error occurred parsing {path}. Please note that YAML must be consistently indented using spaces. Tabs are not allowed. Please have a look at http://www.yaml.org/faq.html\nThe exact error was:\n  {kind}: {message}")]
    Yaml {
        path: String,
        kind: &'static str,
        message: String,
    },

    /// The document is not a mapping of labels to attribute mappings
    #[error("{path} needs to contain a hash of fixtures")]
    NotAHash { path: String },

    /// An attribute is neither a column nor an association of the model
    #[error("No column named {column} found in table {table} (fixture {label:?})")]
    MissingColumn {
        column: String,
        table: String,
        label: String,
    },

    /// An attribute names an association that is not many-to-one
    #[error("Association {column} in table {table} has type {kind}, which is not currently supported (fixture {label:?})")]
    UnsupportedAssociation {
        column: String,
        table: String,
        kind: AssociationKind,
        label: String,
    },

    /// An embellished row still carries a key that is not a column
    #[error("No column named {column:?} found in table {table:?} (attribute on fixture {label:?})")]
    UnknownColumn {
        column: String,
        table: String,
        label: String,
    },
}

/// Fixture engine errors
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// X001: Label never embellished for this fixture
    #[error("[X001] No fixture named '{label}' found for fixture set '{fixture}'")]
    Lookup { fixture: String, label: String },

    /// X002: Row injection after the set was baked
    #[error("[X002] Fixtures have already been compiled! Cannot add '{label}' to '{fixture}' after baking")]
    AlreadyBaked { fixture: String, label: String },

    /// X003: Row injection into a fixture without a definition file
    #[error("[X003] No fixture file for {fixture}")]
    UnknownFixture { fixture: String },

    /// X004: Operation called in the wrong lifecycle state
    #[error("[X004] Cannot {operation} a fixture set that is {actual} (expected {expected})")]
    InvalidState {
        operation: &'static str,
        expected: &'static str,
        actual: FixtureSetState,
    },

    /// X005: Lookup or statement access before the set was baked
    #[error("[X005] Fixture set is {actual}, bake it before calling {operation}")]
    NotBaked {
        operation: &'static str,
        actual: FixtureSetState,
    },

    /// X006: A consumer-supplied loader failed to fetch a fixture instance
    #[error("[X006] Failed to load fixture '{label}' from '{fixture}': {message}")]
    InstanceLoad {
        fixture: String,
        label: String,
        message: String,
    },

    /// X007: Fixture file could not be read
    #[error("[X007] Failed to read fixture file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// X008: A value could not be written in YAML notation
    #[error("[X008] Cannot serialize value of column '{column}' in table '{table}': {message}")]
    Serialize {
        column: String,
        table: String,
        message: String,
    },

    /// X009: Foreign keys between fixture tables form a cycle
    #[error("[X009] Foreign keys form a cycle, no table can be written first: {cycle}")]
    ForeignKeyCycle { cycle: String },

    #[error(transparent)]
    Template(#[from] JinjaError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl FixtureError {
    /// True for malformed-content failures (including template failures).
    pub fn is_format_error(&self) -> bool {
        matches!(self, FixtureError::Format(_) | FixtureError::Template(_))
    }
}

/// Result type alias for FixtureError
pub type FixtureResult<T> = Result<T, FixtureError>;
