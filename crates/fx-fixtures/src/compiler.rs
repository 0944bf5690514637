//! Table compiler: embellished rows to `DELETE` + bulk `INSERT`.

use crate::error::{FixtureError, FixtureResult, FormatError};
use crate::row::FixtureRow;
use fx_core::{ColumnCatalog, ColumnInfo, FixtureValue};
use fx_db::{DbError, Quoting};
use indexmap::IndexSet;

/// Rows and statements for one target table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTable {
    pub table_name: String,
    pub rows: Vec<FixtureRow>,
    pub statements: Vec<String>,
}

impl CompiledTable {
    /// Compile `rows` for `table_name` against its column catalog.
    pub fn compile<Q: Quoting + ?Sized>(
        table_name: &str,
        rows: Vec<FixtureRow>,
        columns: &ColumnCatalog,
        quoting: &Q,
    ) -> FixtureResult<Self> {
        let statements = compile_table(table_name, &rows, columns, quoting)?;
        Ok(Self {
            table_name: table_name.to_string(),
            rows,
            statements,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The leading `DELETE`.
    pub fn delete_statement(&self) -> &str {
        self.statements.first().map_or("", String::as_str)
    }

    /// Everything after the `DELETE`: the bulk `INSERT`, if any rows exist.
    pub fn insert_statements(&self) -> &[String] {
        self.statements.get(1..).unwrap_or(&[])
    }
}

/// Build the statement list for one table.
///
/// The `DELETE` is always emitted. The `INSERT` covers the union of the
/// rows' columns, in first-seen order; a row missing a column gets that
/// column's default.
pub fn compile_table<Q: Quoting + ?Sized>(
    table_name: &str,
    rows: &[FixtureRow],
    columns: &ColumnCatalog,
    quoting: &Q,
) -> FixtureResult<Vec<String>> {
    let table = quoting.quote_identifier(table_name);
    let mut statements = vec![format!("DELETE FROM {}", table)];
    if rows.is_empty() {
        return Ok(statements);
    }

    let mut column_set: IndexSet<&str> = IndexSet::new();
    for row in rows {
        for column in row.attributes.keys() {
            if !columns.contains(column) {
                return Err(FormatError::UnknownColumn {
                    column: column.clone(),
                    table: table_name.to_string(),
                    label: row.label.clone(),
                }
                .into());
            }
            column_set.insert(column.as_str());
        }
    }

    let column_list = column_set
        .iter()
        .map(|c| quoting.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(column_set.len());
        for &column in &column_set {
            let sql = match row.attributes.get(column) {
                Some(value) => quote_value(quoting, value, table_name, column)?,
                None => match columns.get(column) {
                    Some(info) => column_default(quoting, info, table_name)?,
                    None => "NULL".to_string(),
                },
            };
            values.push(sql);
        }
        tuples.push(format!("({})", values.join(", ")));
    }

    statements.push(format!(
        "INSERT INTO {} ({}) VALUES\n{}",
        table,
        column_list,
        tuples.join(",\n")
    ));
    log::debug!(
        "Compiled {} rows x {} columns for {}",
        rows.len(),
        column_set.len(),
        table_name
    );

    Ok(statements)
}

/// SQL for a column the row does not set.
fn column_default<Q: Quoting + ?Sized>(
    quoting: &Q,
    info: &ColumnInfo,
    table_name: &str,
) -> FixtureResult<String> {
    if let Some(expression) = &info.default_expression {
        return Ok(expression.clone());
    }
    match &info.default_literal {
        Some(value) => quote_value(quoting, value, table_name, &info.name),
        None => Ok("NULL".to_string()),
    }
}

/// Quote a value, falling back to its YAML text for shapes without a
/// native SQL literal.
fn quote_value<Q: Quoting + ?Sized>(
    quoting: &Q,
    value: &FixtureValue,
    table_name: &str,
    column: &str,
) -> FixtureResult<String> {
    match quoting.quote_literal(value) {
        Ok(sql) => Ok(sql),
        Err(DbError::Unquotable { .. }) => {
            let text = value
                .to_yaml_string()
                .map_err(|e| FixtureError::Serialize {
                    column: column.to_string(),
                    table: table_name.to_string(),
                    message: e.to_string(),
                })?;
            Ok(quoting.quote_literal(&FixtureValue::String(text))?)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod tests;
