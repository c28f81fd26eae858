// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turn orchestration
//!
//! The [`TurnEngine`] runs a single exchange; [`ChatSession`] and
//! [`run_single_shot`] wrap it with the interactive and one-off lifecycles.

pub mod engine;
mod session;
mod single_shot;

pub use engine::{TurnEngine, TurnInput, TurnOutcome};
pub use session::{ChatSession, ChatSummary, ChatUi};
pub use single_shot::{run_single_shot, SingleShotRequest};
