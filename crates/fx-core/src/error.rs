//! Error types for fx-core

use thiserror::Error;

/// Core error type for Fixtureflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Project directory not found
    #[error("[C003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// C004: Fixture file path cannot be turned into a fixture name
    #[error("[C004] Cannot derive a fixture name from '{path}'")]
    InvalidFixturePath { path: String },

    /// C005: IO error with file path context
    #[error("[C005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C006: Config YAML parse error
    #[error("[C006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Raised by a [`ModelProvider`](crate::model::ModelProvider) when a fixture
/// has no resolvable model.
///
/// The engine treats this as a degradation, not a failure: the table is
/// still compiled from raw column metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// I001: No model registered under the fixture name
    #[error("[I001] No model registered for fixture '{fixture}'")]
    ModelNotFound { fixture: String },

    /// I002: Model refers to a class that is not registered
    #[error("[I002] Unknown model class '{class_name}'")]
    UnknownClass { class_name: String },
}
