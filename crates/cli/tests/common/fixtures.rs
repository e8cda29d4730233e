//! Timeline files for integration tests

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding timeline files and a private config path
pub struct TestTimeline {
    dir: TempDir,
}

impl TestTimeline {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("Failed to create temp dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Config file that never touches the user's home directory
    pub fn config_path(&self) -> String {
        self.dir.path().join("config.toml").display().to_string()
    }

    /// Write `steps` as `name` and return its path as a string
    pub fn write(&self, name: &str, steps: &Value) -> Result<String> {
        let path: PathBuf = self.dir.path().join(name);
        std::fs::write(&path, serde_json::to_string_pretty(steps)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path.display().to_string())
    }
}

/// Add, modify, then rename one file
pub fn rename_history() -> Value {
    json!([
        {
            "id": "c1",
            "message": "add a",
            "author": "dev",
            "timestamp": "2024-01-01T00:00:00Z",
            "changes": [{ "path": "src/a.ts", "status": "added", "additions": 100 }]
        },
        {
            "id": "c2",
            "message": "grow a",
            "author": "dev",
            "timestamp": "2024-01-02T00:00:00Z",
            "changes": [
                { "path": "src/a.ts", "status": "modified", "additions": 20, "deletions": 10 }
            ]
        },
        {
            "id": "c3",
            "message": "rename a to b",
            "author": "dev",
            "timestamp": "2024-01-03T00:00:00Z",
            "changes": [
                { "path": "src/b.ts", "status": "renamed", "previousPath": "src/a.ts" }
            ]
        }
    ])
}

/// [`rename_history`] with a malformed step spliced in second
pub fn history_with_bad_step() -> Value {
    let mut steps = rename_history();
    if let Value::Array(items) = &mut steps {
        items.insert(
            1,
            json!({
                "id": "bad",
                "message": "escape the tree",
                "changes": [{ "path": "../outside", "status": "added", "additions": 1 }]
            }),
        );
    }
    steps
}

/// [`rename_history`] with a step whose record has no status
pub fn history_with_statusless_step() -> Value {
    let mut steps = rename_history();
    if let Value::Array(items) = &mut steps {
        items.insert(
            1,
            json!({
                "id": "nostatus",
                "message": "status dropped by the exporter",
                "changes": [{ "path": "src/c.ts", "additions": 4 }]
            }),
        );
    }
    steps
}
