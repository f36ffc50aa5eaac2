//! Batch orchestration for the HTTP surface.
//!
//! The audio directory and the output artifacts are shared, reset-at-start
//! state, so only one batch may run at a time. A one-permit semaphore is
//! the execution slot; regeneration takes the same slot so it cannot race
//! a running batch.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use kartei_core::card::{Card, Term};
use kartei_core::events::BatchEvent;
use kartei_engine::progress::ChannelObserver;
use kartei_engine::{process_term, BatchRunner};

/// Another batch (or regeneration) currently holds the execution slot.
#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("a batch is already running")]
pub struct BatchBusy;

pub struct BatchOrchestrator {
    runner: Arc<BatchRunner>,
    slot: Arc<tokio::sync::Semaphore>,
}

impl BatchOrchestrator {
    pub fn new(runner: Arc<BatchRunner>) -> Self {
        Self {
            runner,
            slot: Arc::new(tokio::sync::Semaphore::new(1)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Start a batch as a background unit of work. Progress and the final
    /// result flow through the returned channel; when the receiver is
    /// dropped mid-batch, scheduling of further terms stops.
    pub fn try_start(
        &self,
        terms: Vec<Term>,
    ) -> Result<mpsc::UnboundedReceiver<BatchEvent>, BatchBusy> {
        let permit = Arc::clone(&self.slot)
            .try_acquire_owned()
            .map_err(|_| BatchBusy)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Arc::clone(&self.runner);
        let run_id = uuid::Uuid::now_v7();

        tokio::spawn(async move {
            let _permit = permit;
            let cancel = CancellationToken::new();
            let observer = ChannelObserver::new(tx.clone(), cancel.clone());

            tracing::info!(%run_id, terms = terms.len(), "batch accepted");
            match runner.run_to_outputs(&terms, &observer, &cancel, true).await {
                Ok(output) => {
                    let event = BatchEvent::Complete {
                        count: output.cards.len(),
                        generated_at: Utc::now(),
                        cards: output.cards,
                    };
                    let _ = tx.send(event);
                    tracing::info!(%run_id, "batch complete");
                }
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "batch failed");
                    let _ = tx.send(BatchEvent::Failed {
                        message: e.to_string(),
                    });
                }
            }
        });

        Ok(rx)
    }

    /// Re-run the per-term pipeline for one (term, id) pair. The shared
    /// audio directory is not reset, and the deterministic filename makes
    /// the overwrite safe. `Ok(None)` means classification failed again.
    pub async fn regenerate(&self, id: usize, term: Term) -> Result<Option<Card>, BatchBusy> {
        let _permit = self.slot.try_acquire().map_err(|_| BatchBusy)?;
        tracing::info!(id, term = %term, "regenerating single card");
        Ok(process_term(self.runner.services(), id, &term).await)
    }
}
