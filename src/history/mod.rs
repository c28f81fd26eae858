// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation history for ask-gemini
//!
//! Every completed turn (never a failed one) is appended to a JSON log that
//! later prompts read back as a bounded window.

pub mod store;

pub use store::{HistoryRecord, HistoryStore};
