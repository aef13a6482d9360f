use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use gamestore_core::net::protocol::{SNAPSHOT_EVENT, encode_snapshot};
use gamestore_core::snapshot::Snapshot;

use crate::state::{AppState, ConnectionGuard};

fn snapshot_event(snapshot: &Snapshot) -> Option<SseEvent> {
    match encode_snapshot(snapshot) {
        Ok(json) => Some(
            SseEvent::default()
                .event(SNAPSHOT_EVENT)
                .data(json)
                .id(snapshot.version.to_string()),
        ),
        Err(e) => {
            tracing::error!(version = snapshot.version, "Failed to encode snapshot: {e}");
            None
        },
    }
}

/// GET /api/v1/games/stream: the current snapshot immediately, then one
/// full snapshot per change.
pub async fn snapshot_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, StatusCode> {
    let max_sse = state.config.limits.max_sse_subscribers;
    let current = state.sse_subscriber_count.load(Ordering::Relaxed);
    if current >= max_sse {
        tracing::warn!(current, max = max_sse, "SSE subscriber limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let guard = ConnectionGuard::new(Arc::clone(&state.sse_subscriber_count));

    // Subscribe and read the initial state under one lock so no change can
    // fall between them.
    let (rx, initial) = {
        let games = state.games.read().await;
        (games.subscribe(), Arc::new(games.snapshot()))
    };

    let updates = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            // Lagging only skips intermediate snapshots; a newer one follows.
            tracing::warn!("SSE broadcast receive error: {e}");
            None
        },
    });

    let stream = tokio_stream::once(initial)
        .chain(updates)
        .filter_map(move |snapshot: Arc<Snapshot>| {
            let _guard = &guard;
            snapshot_event(&snapshot).map(Ok)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
