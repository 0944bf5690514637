//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::quoting::{AnsiQuoting, Quoting};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use fx_core::{ColumnInfo, FixtureValue, ForeignKey};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn transaction_sync(&self, action: &'static str, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError {
                action,
                message: e.to_string(),
            })
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    fn columns_sync(&self, name: &str) -> DbResult<Vec<ColumnInfo>> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified(name);

        let mut stmt = conn.prepare(
            "SELECT column_name, data_type, column_default \
             FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
        )?;
        let rows = stmt.query_map(duckdb::params![schema, table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut columns = Vec::new();
        for row in rows {
            let (column_name, data_type, default) = row?;
            let mut column = ColumnInfo::new(column_name, data_type);
            match classify_default(default) {
                ColumnDefault::None => {}
                ColumnDefault::Literal(value) => column.default_literal = Some(value),
                ColumnDefault::Expression(sql) => column.default_expression = Some(sql),
            }
            columns.push(column);
        }
        Ok(columns)
    }

    fn list_tables_sync(&self) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut tables = Vec::new();
        for row in rows {
            tables.push(row?);
        }
        Ok(tables)
    }

    fn foreign_keys_sync(&self) -> DbResult<Vec<ForeignKey>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT table_name, referenced_table \
             FROM duckdb_constraints() \
             WHERE constraint_type = 'FOREIGN KEY' AND schema_name = 'main' \
             ORDER BY table_name, referenced_table",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ForeignKey::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;
        let mut foreign_keys = Vec::new();
        for row in rows {
            foreign_keys.push(row?);
        }
        log::debug!("duckdb: found {} foreign key edges", foreign_keys.len());
        Ok(foreign_keys)
    }
}

/// Split `schema.table` into its parts, defaulting the schema to `main`
fn split_qualified(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

#[derive(Debug, PartialEq)]
enum ColumnDefault {
    None,
    Literal(FixtureValue),
    Expression(String),
}

/// Sort a reported column default into a literal or a raw expression.
///
/// Plain numbers, booleans and simple quoted strings become literals;
/// anything else (function calls, casts, sequences) is kept verbatim.
fn classify_default(default: Option<String>) -> ColumnDefault {
    let Some(raw) = default else {
        return ColumnDefault::None;
    };
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("NULL") {
        return ColumnDefault::None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return ColumnDefault::Literal(FixtureValue::Integer(i));
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return ColumnDefault::Literal(FixtureValue::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return ColumnDefault::Literal(FixtureValue::Bool(false));
    }
    if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        if !inner.replace("''", "").contains('\'') {
            return ColumnDefault::Literal(FixtureValue::String(inner.replace("''", "'")));
        }
    }
    ColumnDefault::Expression(raw)
}

impl Quoting for DuckDbBackend {
    fn quote_literal(&self, value: &FixtureValue) -> DbResult<String> {
        AnsiQuoting.quote_literal(value)
    }

    fn quote_identifier(&self, name: &str) -> String {
        AnsiQuoting.quote_identifier(name)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.columns_sync(table)
    }

    async fn list_tables(&self) -> DbResult<Vec<String>> {
        self.list_tables_sync()
    }

    async fn foreign_keys(&self) -> DbResult<Vec<ForeignKey>> {
        self.foreign_keys_sync()
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn begin_transaction(&self) -> DbResult<()> {
        self.transaction_sync("begin", "BEGIN TRANSACTION")
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_sync("commit", "COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_sync("rollback", "ROLLBACK")
    }

    // DuckDB has no switch for foreign key checks. Callers order their
    // writes by `foreign_keys` instead.
    async fn disable_referential_integrity(&self) -> DbResult<()> {
        Ok(())
    }

    async fn enable_referential_integrity(&self) -> DbResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
