// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt assembly: composition of context, history, files and input

pub mod composer;
pub mod files;

pub use composer::{PastTurn, PromptComposer};
pub use files::read_files_as_text;
