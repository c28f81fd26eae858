// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Reading user-supplied files into prompt text

use std::path::{Path, PathBuf};

use crate::error::{AskError, Result};

/// Read every file as UTF-8 and concatenate them, each under a header naming it.
/// Returns `None` for an empty path list. A missing or unreadable file is fatal.
pub fn read_files_as_text(paths: &[PathBuf]) -> Result<Option<String>> {
    if paths.is_empty() {
        return Ok(None);
    }

    let mut blocks = Vec::with_capacity(paths.len());
    for path in paths {
        let content = read_one(path)?;
        blocks.push(format!(
            "Content from file '{}':\n{}",
            path.display(),
            content.trim_end()
        ));
    }
    Ok(Some(blocks.join("\n\n")))
}

fn read_one(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AskError::InvalidInput(
            format!("file not found at path: {}", path.display()),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(AskError::InvalidInput(
            format!("file {} is not valid UTF-8 text", path.display()),
        )),
        Err(e) => Err(AskError::InvalidInput(format!(
            "error reading file {}: {}",
            path.display(),
            e
        ))),
    }
}
