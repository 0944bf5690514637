//! Strongly-typed logical fixture name.

use serde::Serialize;
use std::path::{Component, Path};

/// Logical name of a fixture definition: the file's path relative to its
/// search root, extension stripped, path separators replaced by `_`.
///
/// Always non-empty and free of path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FixtureName(String);

impl FixtureName {
    /// Create a fixture name, returning `None` for empty input or input
    /// still containing a path separator.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() || s.contains('/') || s.contains('\\') {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Derive the logical name of `path` relative to `root`.
    ///
    /// `test/fixtures/accounts/users.yml` under root `test/fixtures`
    /// becomes `accounts_users`.
    pub fn from_relative_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?.with_extension("");
        let parts: Option<Vec<&str>> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        Self::try_new(parts?.join("_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for FixtureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FixtureName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for FixtureName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for FixtureName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FixtureName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FixtureName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
