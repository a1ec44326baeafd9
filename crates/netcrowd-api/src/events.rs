//! Server-sent events: one `change` event per store notification
//!
//! Dashboards subscribe here and re-fetch whatever they display. A client
//! that falls behind gets a `resync` event instead of the missed changes.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

pub(crate) async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Event stream opened");

    let events = BroadcastStream::new(state.changes()).map(|item| {
        let event = match item {
            Ok(change) => Event::default()
                .event("change")
                .json_data(&change)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Could not encode change event");
                    Event::default().event("resync")
                }),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event stream lagged");
                Event::default().event("resync")
            }
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
