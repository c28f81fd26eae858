// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model capability registry

pub mod registry;

pub use registry::{Capability, ModelCapabilityRegistry, ModelDescriptor};
