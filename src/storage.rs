//! Snapshot persistence for the CLI.
//!
//! The library core never does I/O; this module exists so the CLI can
//! carry state between invocations. Everything lives in one data
//! directory:
//!
//! ```text
//! <data-dir>/
//!   tasks.json        # snapshot of all tasks and categories
//!   .taskdeck.toml    # optional config (see config module)
//! ```
//!
//! Writes are atomic (temp file + rename) so a crash mid-save never
//! leaves a truncated snapshot behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::Result;
use crate::task::Task;

const SNAPSHOT_FILE: &str = "tasks.json";
const SCHEMA_VERSION: &str = "taskdeck.v1";

/// On-disk snapshot of the full store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
}

impl Snapshot {
    pub fn new(tasks: Vec<Task>, categories: Vec<Category>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks,
            categories,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// File storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Load the snapshot; a missing file is an empty store.
    pub fn load(&self) -> Result<Snapshot> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(Snapshot::empty());
        }
        let content = fs::read_to_string(&path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    /// Save the snapshot atomically.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        self.write_atomic(&self.snapshot_path(), json.as_bytes())
    }

    /// Write data atomically using temp file + rename, so readers never
    /// see a partial write.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
