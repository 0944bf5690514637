//! fx-core - Core library for Fixtureflow
//!
//! Shared types used across all Fixtureflow components: configuration,
//! label identifiers, fixture values, column and model descriptors, and
//! fixture file discovery.

pub mod column;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fixture_name;
pub mod identify;
pub mod model;
pub mod value;

pub use column::{ColumnCatalog, ColumnInfo, ForeignKey};
pub use config::{Config, DatabaseConfig, DbType};
pub use discovery::{discover_fixture_files, FixtureFile};
pub use error::{CoreError, CoreResult, IntegrityError};
pub use fixture_name::FixtureName;
pub use identify::{identify, identify_integer, identify_uuid, IdKind, Identifier, MAX_ID};
pub use model::{
    Association, AssociationKind, ModelConfig, ModelDescriptor, ModelProvider, ModelRegistry,
};
pub use value::FixtureValue;
