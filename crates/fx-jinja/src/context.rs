//! Per-file context exposed to fixture templates.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;

/// Format used for instants rendered into templates
pub const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Variables injected into a single fixture file's render.
///
/// A fresh context is built for every file, so nothing a template sets is
/// visible to the next one.
#[derive(Debug, Clone, Serialize)]
pub struct FileContext {
    /// Logical fixture name (`{{ fixture_name }}`)
    pub fixture_name: String,
    /// Path of the file being rendered (`{{ fixture_path }}`)
    pub fixture_path: String,
    /// Instant captured for the whole run (`{{ loaded_at }}`)
    pub loaded_at: String,
}

impl FileContext {
    pub fn new(fixture_name: &str, path: &Path, loaded_at: NaiveDateTime) -> Self {
        Self {
            fixture_name: fixture_name.to_string(),
            fixture_path: path.display().to_string(),
            loaded_at: loaded_at.format(INSTANT_FORMAT).to_string(),
        }
    }
}
