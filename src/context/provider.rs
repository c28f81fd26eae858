// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! File-backed context blocks
//!
//! A general block lives in the application home and applies everywhere; a
//! local block lives in the working directory and applies to one project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;

/// Where a context block applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextScope {
    /// Applies to every project
    General,
    /// Applies to the current project
    Local,
}

impl std::fmt::Display for ContextScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextScope::General => write!(f, "general"),
            ContextScope::Local => write!(f, "local"),
        }
    }
}

/// Persistent instructional text placed before every prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    pub scope: ContextScope,
    pub text: String,
}

/// Source of context text
pub trait ContextProvider {
    /// Read the block for a scope; `None` when there is none
    fn read(&self, scope: ContextScope) -> Result<Option<String>>;
}

/// Load at most one block per scope, general first.
pub fn load_blocks(provider: &dyn ContextProvider) -> Result<Vec<ContextBlock>> {
    let mut blocks = Vec::new();
    for scope in [ContextScope::General, ContextScope::Local] {
        if let Some(text) = provider.read(scope)? {
            blocks.push(ContextBlock { scope, text });
        }
    }
    Ok(blocks)
}

/// Context stored in two plain UTF-8 files
#[derive(Debug, Clone)]
pub struct FileContextProvider {
    general_path: PathBuf,
    local_path: PathBuf,
}

impl FileContextProvider {
    /// Use the standard locations
    pub fn new() -> Self {
        Self::with_paths(
            Settings::general_context_path(),
            Settings::local_context_path(),
        )
    }

    /// Use custom locations
    pub fn with_paths(general_path: impl Into<PathBuf>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            general_path: general_path.into(),
            local_path: local_path.into(),
        }
    }

    /// File backing a scope
    pub fn path(&self, scope: ContextScope) -> &PathBuf {
        match scope {
            ContextScope::General => &self.general_path,
            ContextScope::Local => &self.local_path,
        }
    }

    /// Replace the text for a scope
    pub fn write(&self, scope: ContextScope, text: &str) -> Result<()> {
        let path = self.path(scope);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Remove the block for a scope. Returns whether one existed.
    pub fn clear(&self, scope: ContextScope) -> Result<bool> {
        let path = self.path(scope);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl Default for FileContextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextProvider for FileContextProvider {
    fn read(&self, scope: ContextScope) -> Result<Option<String>> {
        let path = self.path(scope);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        tracing::debug!(%scope, path = %path.display(), "loaded context block");
        Ok(Some(text.trim_end().to_string()))
    }
}
