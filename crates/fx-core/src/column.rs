//! Column metadata supplied by the database for each fixture table.

use crate::identify::IdKind;
use crate::value::FixtureValue;
use std::collections::HashMap;

/// One column of a target table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    /// Literal default, quoted like any other value when used
    pub default_literal: Option<FixtureValue>,
    /// Database-side default emitted verbatim instead of a literal
    pub default_expression: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            default_literal: None,
            default_expression: None,
        }
    }

    pub fn with_default_literal(mut self, value: FixtureValue) -> Self {
        self.default_literal = Some(value);
        self
    }

    pub fn with_default_expression(mut self, sql: impl Into<String>) -> Self {
        self.default_expression = Some(sql.into());
        self
    }

    /// Identifier shape to generate when this column is a key.
    pub fn id_kind(&self) -> IdKind {
        IdKind::for_column_type(&self.declared_type)
    }

    /// True when the column stores a calendar date without a time part.
    pub fn is_date_only(&self) -> bool {
        self.declared_type.eq_ignore_ascii_case("DATE")
    }
}

/// A foreign key edge: `table` holds a column referencing `referenced_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub table: String,
    pub referenced_table: String,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, referenced_table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            referenced_table: referenced_table.into(),
        }
    }
}

/// Ordered set of columns for one table, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    columns: Vec<ColumnInfo>,
    index: HashMap<String, usize>,
}

impl ColumnCatalog {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a column in table order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<ColumnInfo> for ColumnCatalog {
    fn from_iter<I: IntoIterator<Item = ColumnInfo>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
