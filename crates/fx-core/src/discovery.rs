//! Discovery of fixture definition files under the configured search paths.

use crate::error::{CoreError, CoreResult};
use crate::fixture_name::FixtureName;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A fixture definition file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
    /// Logical name derived from the path relative to `root`
    pub name: FixtureName,

    /// Path to the YAML file
    pub path: PathBuf,

    /// Search path the file was found under
    pub root: PathBuf,
}

impl FixtureFile {
    pub fn new(root: &Path, path: PathBuf) -> CoreResult<Self> {
        let name = FixtureName::from_relative_path(root, &path).ok_or_else(|| {
            CoreError::InvalidFixturePath {
                path: path.display().to_string(),
            }
        })?;
        Ok(Self {
            name,
            path,
            root: root.to_path_buf(),
        })
    }
}

/// Discover every fixture file under `roots`, in root order.
///
/// Missing roots are skipped. Within a root files are ordered by path. When a
/// later root yields a logical name already taken by a different file, the
/// earlier file wins and the later one is skipped with a warning.
pub fn discover_fixture_files(roots: &[PathBuf]) -> CoreResult<Vec<FixtureFile>> {
    let mut files = Vec::new();
    let mut seen: HashMap<FixtureName, PathBuf> = HashMap::new();

    for root in roots {
        if !root.is_dir() {
            continue;
        }

        let mut paths = Vec::new();
        collect_yaml_recursive(root, &mut paths)?;
        paths.sort();

        for path in paths {
            let file = FixtureFile::new(root, path)?;
            let canonical = canonical_path(&file.path);
            if let Some(existing) = seen.get(&file.name) {
                if *existing != canonical {
                    log::warn!(
                        "Fixture '{}' in {} is shadowed by {}",
                        file.name,
                        file.path.display(),
                        existing.display()
                    );
                }
                continue;
            }
            seen.insert(file.name.clone(), canonical);
            files.push(file);
        }
    }

    Ok(files)
}

fn canonical_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn collect_yaml_recursive(dir: &Path, paths: &mut Vec<PathBuf>) -> CoreResult<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_yaml_recursive(&path, paths)?;
        } else if path.is_file() && path.extension().is_some_and(|e| e == "yml" || e == "yaml")
        {
            paths.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
