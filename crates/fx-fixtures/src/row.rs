//! Fixture rows: a label plus its ordered attribute map.

use fx_core::FixtureValue;
use indexmap::IndexMap;

/// Column (or association) name -> value, in file order.
pub type Attributes = IndexMap<String, FixtureValue>;

/// Placeholder replaced by the row's own label in string values
pub const LABEL_PLACEHOLDER: &str = "$LABEL";

/// One named row of a fixture file.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRow {
    pub label: String,
    pub attributes: Attributes,
}

impl FixtureRow {
    pub fn new(label: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            label: label.into(),
            attributes,
        }
    }

    pub fn get(&self, column: &str) -> Option<&FixtureValue> {
        self.attributes.get(column)
    }
}

/// Build an attribute map from `(name, value)` pairs.
///
/// ```
/// use fx_fixtures::attributes;
/// let attrs = attributes([("name", "Alice".into()), ("age", 30_i64.into())]);
/// assert_eq!(attrs.len(), 2);
/// ```
pub fn attributes<K, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    I: IntoIterator<Item = (K, FixtureValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
