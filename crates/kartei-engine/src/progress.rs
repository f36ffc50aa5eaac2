use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use kartei_core::events::BatchEvent;

/// One progress notification, emitted synchronously before a term's
/// processing begins. Indexes are strictly increasing within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub term: String,
}

/// Typed observer the runner invokes once per term. The network layer
/// adapts this into its streaming protocol; the CLI logs it.
pub trait BatchObserver: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

/// Ignores all notifications.
pub struct NullObserver;

impl BatchObserver for NullObserver {
    fn on_progress(&self, _progress: Progress) {}
}

/// Logs each term as it is picked up.
pub struct LogObserver;

impl BatchObserver for LogObserver {
    fn on_progress(&self, progress: Progress) {
        tracing::info!(
            term = %progress.term,
            "processing term {}/{}",
            progress.index + 1,
            progress.total
        );
    }
}

/// Relays progress into an event channel. When the receiving side is gone
/// (e.g. the HTTP client disconnected), the batch's cancellation token is
/// triggered so no further terms are scheduled.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<BatchEvent>,
    cancel: CancellationToken,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<BatchEvent>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&self, progress: Progress) {
        let event = BatchEvent::Progress {
            index: progress.index,
            total: progress.total,
            term: progress.term,
        };
        if self.tx.send(event).is_err() {
            tracing::info!("progress receiver dropped, cancelling batch");
            self.cancel.cancel();
        }
    }
}
