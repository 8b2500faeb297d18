//! Column-description sidecar files.
//!
//! A dataset may ship with an optional JSON file mapping column names to
//! human-readable descriptions.  The file is matched by name: it starts with
//! the dataset's base name (extension stripped) and ends in
//! `descriptions.json`.  The match is purely advisory; a missing sidecar is
//! not an error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Returns the first file in `dir` whose name matches the sidecar pattern
/// for `dataset_file_name`, or `None` when there is no match.
pub fn find_matching_description_file(
    dir: impl AsRef<Path>,
    dataset_file_name: &str,
) -> io::Result<Option<PathBuf>> {
    let base_name = Path::new(dataset_file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| dataset_file_name.to_owned());

    let pattern = Regex::new(&format!(
        "^{}.*descriptions\\.json$",
        regex::escape(&base_name)
    ))
    .expect("escaped base name always forms a valid pattern");

    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let file_name = entry.file_name();
        if pattern.is_match(&file_name.to_string_lossy()) {
            let path = entry.path();
            debug!("matched sidecar {} for {}", path.display(), dataset_file_name);
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Ordered column-name to description mapping.
///
/// Stored as a sorted map so saved files are stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDescriptions {
    fields: BTreeMap<String, String>,
}

impl FieldDescriptions {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the description for a column.
    pub fn insert(&mut self, column: impl Into<String>, description: impl Into<String>) {
        self.fields.insert(column.into(), description.into());
    }

    /// Returns the description for a column, if any.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Returns the number of described columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no column has a description.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Loads a sidecar file.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(io::Error::from)
    }

    /// Saves the mapping as `<base>_field_descriptions.json` under `dir`,
    /// creating the directory when absent, and returns the written path.
    pub fn save(&self, dir: impl AsRef<Path>, dataset_file_name: &str) -> io::Result<PathBuf> {
        let base_name = Path::new(dataset_file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| dataset_file_name.to_owned());

        fs::create_dir_all(dir.as_ref())?;
        let path = dir
            .as_ref()
            .join(format!("{}_field_descriptions.json", base_name));
        let json = serde_json::to_string_pretty(&self.fields)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_sidecar_is_found_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();

        let mut descriptions = FieldDescriptions::new();
        descriptions.insert("species", "Penguin species name");
        descriptions.insert("bill_length_mm", "Bill length in millimetres");
        let path = descriptions.save(dir.path(), "penguins.csv").unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("penguins"));

        let found = find_matching_description_file(dir.path(), "penguins.csv").unwrap();
        assert_eq!(found, Some(path.clone()));

        let loaded = FieldDescriptions::load(path).unwrap();
        assert_eq!(loaded, descriptions);
    }

    #[test]
    fn unrelated_files_do_not_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("other_descriptions.json"), "{}").unwrap();
        fs::write(dir.path().join("penguins.csv"), "species\n").unwrap();

        let found = find_matching_description_file(dir.path(), "penguins.csv").unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn base_name_with_regex_metacharacters_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data(v1)_descriptions.json"), "{}").unwrap();

        let found = find_matching_description_file(dir.path(), "data(v1).csv").unwrap();
        assert!(found.is_some());

        let miss = find_matching_description_file(dir.path(), "dataXv1Y.csv").unwrap();
        assert_eq!(miss, None);
    }
}
