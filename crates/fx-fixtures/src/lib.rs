//! fx-fixtures - Fixture compilation engine for Fixtureflow
//!
//! Loads templated YAML fixture files, embellishes every row (primary keys,
//! `$LABEL`, timestamps, enums, associations) and compiles each table into a
//! `DELETE` plus one bulk `INSERT`, applied in a single transaction in foreign key order.
//!
//! ```no_run
//! # async fn run(db: &dyn fx_db::Database) -> fx_fixtures::FixtureResult<()> {
//! use fx_fixtures::{FixtureOptions, FixtureSet};
//!
//! let options = FixtureOptions::new(vec!["test/fixtures".into()]);
//! let mut set = FixtureSet::without_models(options);
//! set.apply(db).await?;
//! let alice = set.lookup("users", "alice")?;
//! # let _ = alice;
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod compiler;
pub mod definition;
pub mod embellish;
pub mod error;
pub mod loader;
pub mod order;
pub mod row;
pub mod set;

pub use accessor::FixtureAccessor;
pub use compiler::{compile_table, CompiledTable};
pub use definition::FixtureDefinition;
pub use embellish::Embellisher;
pub use error::{FixtureError, FixtureResult, FormatError};
pub use loader::parse_fixture_document;
pub use order::TableOrder;
pub use row::{attributes, Attributes, FixtureRow};
pub use set::{FixtureOptions, FixtureSet, FixtureSetState};
