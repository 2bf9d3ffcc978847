use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/screenings/{id}/stream", get(screening_stream))
}

/// GET /v1/screenings/:id/stream
/// Live seat activity for one screening, as server-sent events.
async fn screening_stream(
    State(state): State<AppState>,
    Path(screening_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.screening_id() == screening_id => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event(event.event_name()).data(data)))
            }
            // Other screenings and lagged receivers are silently skipped.
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
