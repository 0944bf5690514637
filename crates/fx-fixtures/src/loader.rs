//! Source loader: template expansion, YAML parsing and shape validation.

use crate::error::{FixtureError, FixtureResult, FormatError};
use crate::row::{Attributes, FixtureRow};
use fx_core::{FixtureFile, FixtureValue};
use fx_jinja::{FileContext, JinjaEnvironment};
use serde_yaml::Value as YamlValue;
use std::path::Path;

/// Reserved top-level key, discarded on load
pub const DEFAULTS_KEY: &str = "DEFAULTS";

/// Read, expand and parse one fixture file into raw rows (file order).
pub fn load_fixture_file(
    file: &FixtureFile,
    jinja: &JinjaEnvironment<'_>,
    context: &FileContext,
) -> FixtureResult<Vec<FixtureRow>> {
    let template = std::fs::read_to_string(&file.path).map_err(|e| FixtureError::Io {
        path: file.path.display().to_string(),
        source: e,
    })?;
    let expanded = jinja.render(&template, context)?;
    Ok(parse_fixture_document(&expanded, &file.path)?)
}

/// Parse expanded fixture text.
///
/// The document must be a mapping of string labels to attribute mappings.
/// A blank document yields no rows; a label with no attributes (`alice:`)
/// yields a row with an empty attribute map. `DEFAULTS` is shape-checked
/// like any other entry and then dropped.
pub fn parse_fixture_document(content: &str, path: &Path) -> Result<Vec<FixtureRow>, FormatError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: YamlValue =
        serde_yaml::from_str(content).map_err(|e| FormatError::Yaml {
            path: path.display().to_string(),
            kind: "SyntaxError",
            message: e.to_string(),
        })?;

    let not_a_hash = || FormatError::NotAHash {
        path: path.display().to_string(),
    };

    let mapping = match document {
        YamlValue::Null => return Ok(Vec::new()),
        YamlValue::Mapping(mapping) => mapping,
        _ => return Err(not_a_hash()),
    };

    let mut rows = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let label = match key {
            YamlValue::String(label) => label,
            _ => return Err(not_a_hash()),
        };
        let attributes = match value {
            YamlValue::Null => Attributes::new(),
            YamlValue::Mapping(fields) => {
                let mut attributes = Attributes::with_capacity(fields.len());
                for (column, value) in fields {
                    let column = match column {
                        YamlValue::String(column) => column,
                        _ => return Err(not_a_hash()),
                    };
                    attributes.insert(column, FixtureValue::from_yaml(value));
                }
                attributes
            }
            _ => return Err(not_a_hash()),
        };
        if label == DEFAULTS_KEY {
            continue;
        }
        rows.push(FixtureRow::new(label, attributes));
    }

    Ok(rows)
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
