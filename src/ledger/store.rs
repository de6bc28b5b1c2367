//! Loading and saving ledger documents.
//!
//! This module provides [`LedgerStore`], the only place that touches the
//! disk. Every higher component loads a fresh tree for each operation and
//! hands it back for a full-content save; nothing is cached between calls.

use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{Span, debug};

use crate::error::{LedgerError, LedgerResult};
use crate::logging::component_span;

/// Fails with `Validation` when `path` is empty.
pub fn require_path(path: &Path, field: &str) -> LedgerResult<()> {
    if path.as_os_str().is_empty() {
        return Err(LedgerError::validation(field, "path must not be empty"));
    }
    Ok(())
}

/// Fails with `Validation` when `path` is empty and `NotFound` when it does
/// not name an existing file.
pub fn require_file(path: &Path, field: &str, operation: &'static str) -> LedgerResult<()> {
    require_path(path, field)?;
    if !path.is_file() {
        return Err(LedgerError::NotFound {
            operation,
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Reads and writes ledger documents.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    span: Span,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore {
    /// Creates a store logging under the `ledger_store` component.
    pub fn new() -> Self {
        Self::with_span(component_span("ledger_store"))
    }

    /// Creates a store logging under the given span.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Reads the raw text of a file.
    ///
    /// # Returns
    ///
    /// Returns the content, or an error if:
    /// - The path is empty (`Validation`)
    /// - The file does not exist (`NotFound`)
    /// - The file cannot be read (`Io`)
    pub fn read_text(&self, path: &Path, operation: &'static str) -> LedgerResult<String> {
        let _enter = self.span.enter();
        require_path(path, "path")?;

        fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LedgerError::NotFound {
                operation,
                path: path.display().to_string(),
            },
            _ => LedgerError::Io {
                operation,
                path: path.display().to_string(),
                source,
            },
        })
    }

    /// Loads a document and parses it into a tree.
    ///
    /// # Returns
    ///
    /// Returns the parsed tree, or an error if:
    /// - The path is empty (`Validation`)
    /// - The file does not exist (`NotFound`)
    /// - The file is not valid JSON (`Parse`)
    pub fn load(&self, path: &Path, operation: &'static str) -> LedgerResult<Value> {
        let content = self.read_text(path, operation)?;
        let _enter = self.span.enter();

        let document = serde_json::from_str(&content).map_err(|source| LedgerError::Parse {
            operation,
            path: path.display().to_string(),
            source,
        })?;
        debug!(operation, path = %path.display(), bytes = content.len(), "Loaded document");
        Ok(document)
    }

    /// Saves a tree to `path`, replacing the whole file.
    ///
    /// The content goes to a temporary file in the target's directory, is
    /// flushed to disk and then renamed over the target, so readers and a
    /// crash only ever leave the old or the new document. Missing parent
    /// directories are created. A failed save removes its temporary file.
    pub fn save(&self, path: &Path, document: &Value, operation: &'static str) -> LedgerResult<()> {
        let _enter = self.span.enter();
        require_path(path, "path")?;
        if path.file_name().is_none() {
            return Err(LedgerError::validation("path", "path must name a file"));
        }

        let io_error = |source: std::io::Error| LedgerError::Io {
            operation,
            path: path.display().to_string(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(io_error)?;
                parent
            }
            _ => Path::new("."),
        };

        let mut content = serde_json::to_vec_pretty(document)
            .map_err(|e| io_error(std::io::Error::other(e)))?;
        content.push(b'\n');

        let mut temp = tempfile::Builder::new()
            .prefix(".ledger-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_error)?;
        temp.write_all(&content).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(path).map_err(|e| io_error(e.error))?;
        sync_directory(dir).map_err(io_error)?;

        debug!(operation, path = %path.display(), bytes = content.len(), "Saved document");
        Ok(())
    }
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_returns_same_tree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let store = LedgerStore::new();
        let doc = json!({ "Pay": { "item": [ { "name": "A", "amount": "1" } ] } });

        store.save(&path, &doc, "test").unwrap();
        assert_eq!(store.load(&path, "test").unwrap(), doc);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("nested").join("employees.json");

        LedgerStore::new().save(&path, &json!({}), "test").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let store = LedgerStore::new();

        store.save(&path, &json!({ "a": 1 }), "test").unwrap();
        store.save(&path, &json!({ "a": 2 }), "test").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.load(&path, "test").unwrap(), json!({ "a": 2 }));
    }

    #[test]
    fn test_failed_save_removes_temporary_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "x").unwrap();

        let result = LedgerStore::new().save(&path, &json!({ "a": 1 }), "test");

        assert!(matches!(result, Err(LedgerError::Io { operation: "test", .. })));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ledger.json")]);
    }

    #[test]
    fn test_save_preserves_field_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"surname":"Smith","name":"Alice"}"#).unwrap();
        let store = LedgerStore::new();

        let doc = store.load(&path, "test").unwrap();
        store.save(&path, &doc, "test").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("\"surname\"").unwrap() < text.find("\"name\"").unwrap());
    }

    #[test]
    fn test_load_missing_file_returns_not_found() {
        let result = LedgerStore::new().load(Path::new("/nonexistent/ledger.json"), "load");
        match result {
            Err(LedgerError::NotFound { operation, path }) => {
                assert_eq!(operation, "load");
                assert!(path.ends_with("ledger.json"));
            }
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_empty_path_returns_validation() {
        let result = LedgerStore::new().load(Path::new(""), "load");
        assert!(matches!(result, Err(LedgerError::Validation { .. })));
    }

    #[test]
    fn test_load_malformed_document_returns_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"Pay\": ").unwrap();

        let result = LedgerStore::new().load(&path, "load");
        assert!(matches!(result, Err(LedgerError::Parse { .. })));
    }

    #[test]
    fn test_require_file_distinguishes_empty_and_missing() {
        assert!(matches!(
            require_file(Path::new(""), "input", "transform"),
            Err(LedgerError::Validation { field, .. }) if field == "input"
        ));
        assert!(matches!(
            require_file(Path::new("/nonexistent/x.json"), "input", "transform"),
            Err(LedgerError::NotFound { operation: "transform", .. })
        ));
    }
}
