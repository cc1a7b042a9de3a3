//! Ordered source/destination stylesheet mappings

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DispatchError, DispatchResult, ManifestError, ManifestResult};

/// A single build task: one source stylesheet compiled into one destination.
/// Both paths are relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "input")]
    pub source: PathBuf,
    #[serde(rename = "output")]
    pub destination: PathBuf,
}

impl MappingEntry {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Ordered collection of mapping entries, immutable once constructed.
///
/// Entries keep the manifest's defined order: object keys are read in file
/// order (serde_json's preserve_order) and arrays are already ordered.
#[derive(Debug, Clone)]
pub struct PathMapping {
    entries: Vec<MappingEntry>,
    warnings: Vec<String>,
}

impl PathMapping {
    /// Build a mapping from explicit entries, validating path invariants
    pub fn new(entries: Vec<MappingEntry>) -> ManifestResult<Self> {
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();

        for entry in &entries {
            validate_relative(&entry.source, "source")?;
            validate_relative(&entry.destination, "destination")?;

            if !seen.insert(entry.source.clone()) {
                warnings.push(format!(
                    "duplicate mapping source: {}",
                    entry.source.display()
                ));
            }
        }

        Ok(Self { entries, warnings })
    }

    /// Build a single-entry mapping
    pub fn single(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> ManifestResult<Self> {
        Self::new(vec![MappingEntry::new(source, destination)])
    }

    /// Load a mapping from a JSON manifest file
    pub fn from_manifest(path: &Path) -> ManifestResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ManifestError::new(format!("cannot read manifest: {}", e)).with_path(path))?;

        Self::from_json_str(&raw).map_err(|e| e.with_path(path))
    }

    /// Parse a mapping from manifest JSON.
    ///
    /// Accepts either an object of `"source": "destination"` pairs or an
    /// array of `{"input": ..., "output": ...}` objects.
    pub fn from_json_str(raw: &str) -> ManifestResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ManifestError::new(format!("invalid JSON: {}", e)))?;

        let entries = match value {
            serde_json::Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (source, destination) in map {
                    let destination = destination.as_str().ok_or_else(|| {
                        ManifestError::new(format!(
                            "destination for '{}' must be a string",
                            source
                        ))
                    })?;
                    entries.push(MappingEntry::new(source, destination));
                }
                entries
            }
            serde_json::Value::Array(_) => serde_json::from_value(value).map_err(|e| {
                ManifestError::new(format!(
                    "array entries must be objects with 'input' and 'output': {}",
                    e
                ))
            })?,
            _ => {
                return Err(ManifestError::new(
                    "manifest must be a JSON object or an array of entries".to_string(),
                ))
            }
        };

        Self::new(entries)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Non-fatal findings from validation, e.g. duplicate sources
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand directory entries into one entry per stylesheet.
    ///
    /// An entry whose source resolves to a directory under `base_dir` is
    /// replaced, in place, by one entry per `.css` file found there, with
    /// destinations mirroring the relative structure under the entry's
    /// destination directory. File entries pass through untouched.
    pub fn expand(&self, base_dir: &Path, recursive: bool) -> DispatchResult<Vec<MappingEntry>> {
        let mut expanded = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let source_abs = base_dir.join(&entry.source);
            if !source_abs.is_dir() {
                expanded.push(entry.clone());
                continue;
            }

            let files = find_css_files(&source_abs, recursive).map_err(|e| {
                DispatchError::io(
                    format!("cannot list stylesheet directory: {}", e),
                    Some(entry.source.clone()),
                )
            })?;

            for file in files {
                expanded.push(map_source_to_output(
                    &source_abs,
                    &file,
                    &entry.source,
                    &entry.destination,
                ));
            }
        }

        Ok(expanded)
    }
}

/// Find CSS files in a directory, in sorted order for deterministic builds.
/// If recursive is true, walk the whole tree; otherwise list direct children.
fn find_css_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut css_files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(std::io::Error::other)?;
            let path = entry.path();
            if is_css_file(path) {
                css_files.push(path.to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if is_css_file(&path) {
                css_files.push(path);
            }
        }
    }

    css_files.sort();
    Ok(css_files)
}

fn is_css_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "css")
}

/// Map a discovered stylesheet into its destination entry, preserving the
/// file's directory structure relative to the mapping's source directory.
fn map_source_to_output(
    source_abs: &Path,
    file: &Path,
    source_rel: &Path,
    destination_rel: &Path,
) -> MappingEntry {
    let relative = file.strip_prefix(source_abs).unwrap_or(file);
    MappingEntry::new(source_rel.join(relative), destination_rel.join(relative))
}

fn validate_relative(path: &Path, role: &str) -> ManifestResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ManifestError::new(format!("{} path must not be empty", role)));
    }

    if path.is_absolute() {
        return Err(ManifestError::new(format!(
            "{} path must be relative to the base directory: {}",
            role,
            path.display()
        )));
    }

    Ok(())
}
