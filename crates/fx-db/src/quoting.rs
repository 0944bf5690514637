//! SQL literal and identifier quoting

use crate::error::{DbError, DbResult};
use fx_core::FixtureValue;

/// Turns fixture values and names into SQL text.
pub trait Quoting {
    /// Quote a value as a SQL literal.
    ///
    /// Fails with [`DbError::Unquotable`] when the value has no native
    /// literal form (sequences, mappings, non-finite floats).
    fn quote_literal(&self, value: &FixtureValue) -> DbResult<String>;

    /// Quote a table or column name, handling `schema.table` names.
    fn quote_identifier(&self, name: &str) -> String;
}

/// ANSI quoting: single-quoted strings, double-quoted identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiQuoting;

impl Quoting for AnsiQuoting {
    fn quote_literal(&self, value: &FixtureValue) -> DbResult<String> {
        Ok(match value {
            FixtureValue::Null => "NULL".to_string(),
            FixtureValue::Bool(true) => "TRUE".to_string(),
            FixtureValue::Bool(false) => "FALSE".to_string(),
            FixtureValue::Integer(i) => i.to_string(),
            FixtureValue::Float(f) if f.is_finite() => f.to_string(),
            FixtureValue::Float(_) => return Err(DbError::Unquotable { kind: "non-finite" }),
            FixtureValue::String(s) => quote_string(s),
            FixtureValue::Date(d) => quote_string(&d.format("%Y-%m-%d").to_string()),
            FixtureValue::DateTime(dt) => {
                quote_string(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            FixtureValue::Uuid(u) => quote_string(&u.to_string()),
            FixtureValue::Raw(sql) => sql.clone(),
            FixtureValue::Structured(v) => {
                return Err(DbError::Unquotable {
                    kind: structured_kind(v),
                })
            }
        })
    }

    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn structured_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        _ => "structured",
    }
}
