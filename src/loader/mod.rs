//! Loaders
//!
//! Turn source text into [`ProblemRecord`] values: JSON manifests holding
//! already-structured records, or a directory of markdown problem files.
//! Loaders only read; nothing here writes to disk.

pub mod markdown;

use crate::bank::Store;
use crate::error::{Error, Result};
use crate::model::ProblemRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// File extensions to parse, without the dot (case-insensitive)
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            recursive: false,
        }
    }
}

impl LoaderConfig {
    /// Create a new loader config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted file extensions
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether subdirectories are scanned
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Parse a JSON array of records
pub fn from_json_str(text: &str) -> Result<Vec<ProblemRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Read a JSON manifest from disk
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<ProblemRecord>> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let records = from_json_str(&text).map_err(|e| Error::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), records = records.len(), "loaded JSON manifest");
    Ok(records)
}

/// Parse every matching markdown file under `dir`, in sorted path order
pub fn load_dir(dir: impl AsRef<Path>, config: &LoaderConfig) -> Result<Vec<ProblemRecord>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    collect_files(dir, config, &mut files)?;
    files.sort();

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        let text = read_source(path)?;
        let fallback_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        match markdown::parse_problem(&text, fallback_id) {
            Ok(record) => {
                debug!(path = %path.display(), id = record.id(), "parsed problem file");
                records.push(record);
            }
            Err(Error::MalformedRecord(reason)) => {
                return Err(Error::Parse {
                    path: path.display().to_string(),
                    reason,
                })
            }
            Err(e) => return Err(e),
        }
    }

    info!(dir = %dir.display(), records = records.len(), "scanned problem directory");
    Ok(records)
}

/// Read one source file; failures carry its path
fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn collect_files(dir: &Path, config: &LoaderConfig, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if config.recursive {
                collect_files(&path, config, files)?;
            }
        } else if config.accepts(&path) {
            files.push(path);
        } else {
            warn!(path = %path.display(), "skipping file with unrecognized extension");
        }
    }
    Ok(())
}

/// Load a JSON manifest straight into a store
pub fn load_store_json(path: impl AsRef<Path>) -> Result<Store> {
    Store::load(load_json(path)?)
}

/// Load a markdown directory straight into a store
pub fn load_store_dir(dir: impl AsRef<Path>, config: &LoaderConfig) -> Result<Store> {
    Store::load(load_dir(dir, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> serde_json::Value {
        json!([
            {
                "id": "closed_accounts",
                "title": "Closed Accounts",
                "input_schema": [
                    { "table": "accounts", "name": "account_id", "type": "int" },
                    { "table": "accounts", "name": "status", "type": "varchar(10)" }
                ],
                "expected_output_schema": [{ "name": "account_id", "type": "int" }],
                "sample_rows": [
                    { "table": "accounts", "values": { "account_id": 1, "status": "closed" } }
                ],
                "reference_query": "SELECT account_id FROM accounts WHERE status = 'closed'"
            },
            {
                "id": "open_accounts",
                "expected_output_schema": [{ "name": "account_id", "type": "int" }],
                "reference_query": "SELECT account_id FROM accounts WHERE status = 'open'"
            }
        ])
    }

    #[test]
    fn test_from_json_str() {
        let records = from_json_str(&manifest().to_string()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sample_rows().len(), 1);
        assert_eq!(records[1].title(), "open_accounts");
    }

    #[test]
    fn test_from_json_str_rejects_malformed() {
        let text = json!([{ "id": "x", "reference_query": "SELECT 1" }]).to_string();
        assert!(matches!(from_json_str(&text), Err(Error::Json(_))));
    }

    #[test]
    fn test_config_accepts() {
        let config = LoaderConfig::new().extensions(["md", "markdown"]);
        assert!(config.accepts(Path::new("a/b.MD")));
        assert!(config.accepts(Path::new("b.markdown")));
        assert!(!config.accepts(Path::new("b.sql")));
        assert!(!config.accepts(Path::new("README")));
        assert!(!LoaderConfig::default().recursive);
    }
}
