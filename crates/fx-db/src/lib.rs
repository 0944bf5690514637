//! fx-db - Database abstraction layer for Fixtureflow
//!
//! This crate provides the `Database` trait (schema introspection, quoting,
//! execution and transaction control) and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod quoting;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use quoting::{quote_string, AnsiQuoting, Quoting};
pub use traits::Database;
