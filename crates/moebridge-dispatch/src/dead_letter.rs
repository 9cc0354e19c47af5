//! Append-only JSONL store for statements that could not be delivered.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    #[serde(with = "time::serde::iso8601")]
    pub failed_at: OffsetDateTime,
    pub event_name: String,
    pub error: String,
    /// The mapped statement as it would have been sent.
    pub event: Value,
}

impl DeadLetter {
    pub fn new(event_name: &str, error: impl ToString, event: Value) -> Self {
        Self {
            failed_at: OffsetDateTime::now_utc(),
            event_name: event_name.to_string(),
            error: error.to_string(),
            event,
        }
    }
}

/// Clones share one write lock, so lines from concurrent writers never
/// interleave.
#[derive(Debug, Clone)]
pub struct DeadLetterStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DeadLetterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one letter as a single line.
    pub fn append(&self, letter: &DeadLetter) -> Result<()> {
        let mut line = serde_json::to_vec(letter)?;
        line.push(b'\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }

    /// [`append`](Self::append) on the blocking thread pool.
    pub async fn persist(&self, letter: DeadLetter) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.append(&letter)).await?
    }

    /// Reads every stored letter. A missing file holds none.
    pub fn load(&self) -> Result<Vec<DeadLetter>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut letters = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            letters.push(serde_json::from_str(&line)?);
        }
        Ok(letters)
    }
}
