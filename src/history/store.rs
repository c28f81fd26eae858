// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! History store implementation
//!
//! Stores completed turns in a JSON file, rewritten atomically on every append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::prompt::PastTurn;

/// One completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// When the turn completed
    pub timestamp: DateTime<Utc>,
    /// Model that produced the response
    pub model: String,
    /// What the user typed
    pub prompt: String,
    /// Final response text
    pub response: String,
}

impl HistoryRecord {
    /// Create a record stamped now
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            model: model.into(),
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

impl From<&HistoryRecord> for PastTurn {
    fn from(record: &HistoryRecord) -> Self {
        PastTurn::new(record.prompt.clone(), record.response.clone())
    }
}

/// Append-only conversation log
pub struct HistoryStore {
    /// Path to the history file
    path: PathBuf,
    /// Cached records, oldest first
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    /// Open the default history file
    pub fn open() -> Result<Self> {
        Self::open_at(Settings::history_path())
    }

    /// Open or create a history file at a specific path.
    /// Unparseable content is treated as an empty history.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = if path.exists() {
            let content = std::fs::read(&path)?;
            match serde_json::from_slice(&content) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "history file is corrupt, starting with an empty history"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self { path, records })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all records to a temp file, then rename over the real one.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Append a record and persist immediately
    pub fn append_and_persist(&mut self, record: HistoryRecord) -> Result<()> {
        self.records.push(record);
        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }
        tracing::debug!(records = self.records.len(), "history persisted");
        Ok(())
    }

    /// The most recent `max_turns` records, oldest first
    pub fn read_window(&self, max_turns: usize) -> Vec<HistoryRecord> {
        let start = self.records.len().saturating_sub(max_turns);
        self.records[start..].to_vec()
    }

    /// Remove every record
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.save()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
