// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Saving binary response parts to disk

use std::path::{Path, PathBuf};

use crate::error::Result;

const MAX_SLUG_LEN: usize = 40;
const DEFAULT_SLUG: &str = "image";

/// Writes inline binary content into a directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `data` as `gemini_<timestamp>_<slug>.<ext>`, never overwriting
    /// an existing file.
    pub fn save(&self, data: &[u8], mime_type: &str, slug: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let ext = extension_for(mime_type);
        let stem = format!("gemini_{}_{}", stamp, slug);

        let mut path = self.dir.join(format!("{}.{}", stem, ext));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}_{}.{}", stem, n, ext));
            n += 1;
        }

        std::fs::write(&path, data)?;
        tracing::info!(path = %path.display(), bytes = data.len(), "saved artifact");
        Ok(path)
    }
}

/// File extension for a MIME type; unknown types get `bin`
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "bin",
    }
}

/// Filesystem-safe slug of a prompt: lowercase ASCII alphanumerics, other
/// runs collapsed to `_`, at most 40 characters.
pub fn slugify(prompt: &str) -> String {
    let mut slug = String::with_capacity(MAX_SLUG_LEN);
    let mut pending_sep = false;

    for c in prompt.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}
