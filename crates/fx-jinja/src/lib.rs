//! fx-jinja - Jinja templating layer for Fixtureflow
//!
//! Fixture files are expanded with minijinja before they are parsed as YAML.
//! Templates can call `var()`, `env()`, `identify()`, `days_ago()`,
//! `days_from_now()` and `error()`, and read `fixture_name`, `fixture_path`
//! and `loaded_at`.

pub mod context;
pub mod environment;
pub mod error;
pub mod functions;

pub use context::FileContext;
pub use environment::JinjaEnvironment;
pub use error::{JinjaError, JinjaResult};
