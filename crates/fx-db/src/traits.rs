//! Database trait definition

use crate::error::DbResult;
use crate::quoting::Quoting;
use async_trait::async_trait;
use fx_core::{ColumnInfo, ForeignKey};

/// Database abstraction trait for Fixtureflow
///
/// Supplies the schema introspection, quoting and execution the fixture
/// engine needs. Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Quoting + Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Columns of a table in declaration order (empty if the table is missing)
    async fn columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>>;

    /// Names of all base tables
    async fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Foreign key edges between base tables, one per referencing table and
    /// referenced table pair
    async fn foreign_keys(&self) -> DbResult<Vec<ForeignKey>>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    async fn begin_transaction(&self) -> DbResult<()>;

    async fn commit(&self) -> DbResult<()>;

    async fn rollback(&self) -> DbResult<()>;

    /// Suspend foreign key checking until re-enabled
    async fn disable_referential_integrity(&self) -> DbResult<()>;

    async fn enable_referential_integrity(&self) -> DbResult<()>;
}
