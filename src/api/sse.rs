//! Server-Sent Events support

use crate::runtime::TranscriptEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: TranscriptEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<TranscriptEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(transcript_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(transcript_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn transcript_event_to_axum(event: TranscriptEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn event_payload(event: TranscriptEvent) -> (&'static str, serde_json::Value) {
    match event {
        TranscriptEvent::Init { snapshot } => (
            "init",
            json!({
                "type": "init",
                "widget": snapshot
            }),
        ),
        TranscriptEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        TranscriptEvent::Reset => (
            "reset",
            json!({
                "type": "reset"
            }),
        ),
        TranscriptEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}
