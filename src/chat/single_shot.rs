// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! One prompt, one answer

use crate::chat::engine::{TurnEngine, TurnInput, TurnOutcome};
use crate::error::Result;
use crate::history::{HistoryRecord, HistoryStore};
use crate::llm::{InputImage, ResponseObserver};
use crate::prompt::PastTurn;

/// Inputs for a single-shot query
#[derive(Debug, Clone, Default)]
pub struct SingleShotRequest {
    pub prompt: String,
    pub file_text: Option<String>,
    pub image: Option<InputImage>,
    pub generate_image: bool,
    /// Read and extend the persistent history
    pub use_history: bool,
}

/// Run one query. A successful turn is appended to `history` when
/// `use_history` is set.
pub async fn run_single_shot(
    engine: &TurnEngine,
    history: &mut HistoryStore,
    model: &str,
    request: &SingleShotRequest,
    observer: &mut dyn ResponseObserver,
) -> Result<TurnOutcome> {
    let past: Vec<PastTurn> = if request.use_history {
        history
            .read_window(engine.history_window())
            .iter()
            .map(PastTurn::from)
            .collect()
    } else {
        Vec::new()
    };

    let input = TurnInput {
        prompt: &request.prompt,
        file_text: request.file_text.as_deref(),
        image: request.image.as_ref(),
        generate_image: request.generate_image,
    };
    let outcome = engine.run_turn(model, input, &past, observer).await?;

    if request.use_history {
        history.append_and_persist(HistoryRecord::new(
            outcome.model.clone(),
            request.prompt.clone(),
            outcome.result.history_text(),
        ))?;
    }

    Ok(outcome)
}
