//! Adapts the engine's event channel into an incrementally-flushed NDJSON
//! body: one JSON object per line, written as soon as it is produced.

use std::convert::Infallible;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use kartei_core::events::BatchEvent;

/// Serialize one event as an NDJSON line.
pub fn to_line(event: &BatchEvent) -> String {
    let mut line = serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize batch event");
        r#"{"type":"failed","message":"event serialization error"}"#.to_string()
    });
    line.push('\n');
    line
}

/// The channel's events as a body stream. The stream ends when the batch
/// task drops its sender, which happens right after the terminal event.
pub fn event_stream(
    rx: mpsc::UnboundedReceiver<BatchEvent>,
) -> impl Stream<Item = Result<String, Infallible>> {
    UnboundedReceiverStream::new(rx).map(|event| Ok(to_line(&event)))
}
