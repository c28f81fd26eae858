// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Context blocks prepended to every prompt

pub mod provider;

pub use provider::{load_blocks, ContextBlock, ContextProvider, ContextScope, FileContextProvider};
