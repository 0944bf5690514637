//! Deterministic label to identifier hashing.
//!
//! Fixtures reference each other by label instead of by numeric id. Both
//! sides of a reference hash the label the same way, so the foreign key on
//! one row matches the primary key of the other regardless of load order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound (exclusive) for generated integer identifiers.
///
/// Keeps generated ids below 2^30 so they stay clear of typical
/// auto-increment ranges.
pub const MAX_ID: u32 = (1 << 30) - 1;

/// Shape of identifier to generate for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    /// Integer below [`MAX_ID`]
    #[default]
    Integer,
    /// Name-based (version 5) UUID
    Uuid,
}

impl IdKind {
    /// Pick the identifier shape for a declared SQL column type.
    pub fn for_column_type(declared_type: &str) -> Self {
        if declared_type.to_ascii_uppercase().contains("UUID") {
            IdKind::Uuid
        } else {
            IdKind::Integer
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Integer => write!(f, "integer"),
            IdKind::Uuid => write!(f, "uuid"),
        }
    }
}

impl std::str::FromStr for IdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" | "int" => Ok(IdKind::Integer),
            "uuid" => Ok(IdKind::Uuid),
            other => Err(format!(
                "unknown identifier kind '{}', expected 'integer' or 'uuid'",
                other
            )),
        }
    }
}

/// Identifier of a fixture row, as exposed by the lookup surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Integer key (generated or explicit)
    Integer(i64),
    /// UUID key (generated or explicit)
    Uuid(Uuid),
    /// Explicit non-numeric key written in the fixture file
    Text(String),
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Integer(i) => write!(f, "{}", i),
            Identifier::Uuid(u) => write!(f, "{}", u),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

/// Return a stable identifier for `label`.
///
/// Integer identifiers are CRC-32 hashes reduced below [`MAX_ID`]; UUIDs are
/// RFC 4122 version 5 hashes over the OID namespace.
pub fn identify(label: &str, kind: IdKind) -> Identifier {
    match kind {
        IdKind::Integer => Identifier::Integer(identify_integer(label)),
        IdKind::Uuid => Identifier::Uuid(identify_uuid(label)),
    }
}

/// Integer form of [`identify`].
pub fn identify_integer(label: &str) -> i64 {
    i64::from(crc32fast::hash(label.as_bytes()) % MAX_ID)
}

/// UUID form of [`identify`].
pub fn identify_uuid(label: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes())
}

#[cfg(test)]
#[path = "identify_test.rs"]
mod tests;
