//! Attribute values carried by fixture rows.

use crate::identify::Identifier;
use chrono::{NaiveDate, NaiveDateTime};
use serde_yaml::Value as YamlValue;
use uuid::Uuid;

/// YAML tag marking a raw SQL expression (`created_at: !sql CURRENT_TIMESTAMP`).
pub const RAW_SQL_TAG: &str = "sql";

/// A single attribute value of a fixture row.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    /// SQL fragment emitted verbatim, never quoted
    Raw(String),
    /// Sequences, mappings and anything else without a scalar shape
    Structured(YamlValue),
}

impl FixtureValue {
    /// Convert a parsed YAML node into a fixture value.
    ///
    /// Values tagged `!sql` become [`FixtureValue::Raw`]; other tags are
    /// unwrapped and converted by their inner value.
    pub fn from_yaml(value: YamlValue) -> Self {
        match value {
            YamlValue::Null => FixtureValue::Null,
            YamlValue::Bool(b) => FixtureValue::Bool(b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FixtureValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    FixtureValue::Float(f)
                } else {
                    FixtureValue::String(n.to_string())
                }
            }
            YamlValue::String(s) => FixtureValue::String(s),
            YamlValue::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                if tag.trim_start_matches('!') == RAW_SQL_TAG {
                    match tagged.value {
                        YamlValue::String(sql) => FixtureValue::Raw(sql),
                        other => FixtureValue::Raw(yaml_scalar_text(&other)),
                    }
                } else {
                    FixtureValue::from_yaml(tagged.value)
                }
            }
            structured @ (YamlValue::Sequence(_) | YamlValue::Mapping(_)) => {
                FixtureValue::Structured(structured)
            }
        }
    }

    /// Convert back into a YAML node, used when a value has to be written
    /// out in the fixture file notation.
    pub fn to_yaml(&self) -> YamlValue {
        match self {
            FixtureValue::Null => YamlValue::Null,
            FixtureValue::Bool(b) => YamlValue::Bool(*b),
            FixtureValue::Integer(i) => YamlValue::Number((*i).into()),
            FixtureValue::Float(f) => YamlValue::Number((*f).into()),
            FixtureValue::String(s) => YamlValue::String(s.clone()),
            FixtureValue::Date(d) => YamlValue::String(d.format("%Y-%m-%d").to_string()),
            FixtureValue::DateTime(dt) => {
                YamlValue::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            FixtureValue::Uuid(u) => YamlValue::String(u.to_string()),
            FixtureValue::Raw(sql) => YamlValue::String(sql.clone()),
            FixtureValue::Structured(v) => v.clone(),
        }
    }

    /// Serialize in YAML notation.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_yaml())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FixtureValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FixtureValue::Null)
    }

    /// Interpret this value as a row identifier.
    ///
    /// Returns `None` for null and for shapes that cannot act as a key.
    pub fn to_identifier(&self) -> Option<Identifier> {
        match self {
            FixtureValue::Integer(i) => Some(Identifier::Integer(*i)),
            FixtureValue::Uuid(u) => Some(Identifier::Uuid(*u)),
            FixtureValue::String(s) => Some(match Uuid::parse_str(s) {
                Ok(u) => Identifier::Uuid(u),
                Err(_) => Identifier::Text(s.clone()),
            }),
            _ => None,
        }
    }
}

impl From<Identifier> for FixtureValue {
    fn from(id: Identifier) -> Self {
        match id {
            Identifier::Integer(i) => FixtureValue::Integer(i),
            Identifier::Uuid(u) => FixtureValue::Uuid(u),
            Identifier::Text(s) => FixtureValue::String(s),
        }
    }
}

impl From<&str> for FixtureValue {
    fn from(s: &str) -> Self {
        FixtureValue::String(s.to_string())
    }
}

impl From<String> for FixtureValue {
    fn from(s: String) -> Self {
        FixtureValue::String(s)
    }
}

impl From<i64> for FixtureValue {
    fn from(i: i64) -> Self {
        FixtureValue::Integer(i)
    }
}

impl From<bool> for FixtureValue {
    fn from(b: bool) -> Self {
        FixtureValue::Bool(b)
    }
}

fn yaml_scalar_text(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => "NULL".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
