//! Server-sent events endpoint relaying the event bus to browser sessions

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use folio_events::{AppEvent, EventBus};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

/// Routes serving the event stream, relative to the API prefix
pub fn routes(events: EventBus) -> Router {
    Router::new()
        .route("/events", get(stream_events))
        .with_state(events)
}

async fn stream_events(
    State(events): State<EventBus>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(
        clients = events.subscriber_count() + 1,
        "event stream client connected"
    );

    Sse::new(event_stream(&events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

/// Convert a fresh bus subscription into SSE frames. Lagged receivers skip
/// the events they missed and keep streaming.
pub fn event_stream(events: &EventBus) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(events.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => to_sse(&event).map(Ok),
            Err(err) => {
                tracing::warn!(error = %err, "event stream client lagged");
                None
            }
        }
    })
}

fn to_sse(event: &AppEvent) -> Option<Event> {
    match Event::default().event(&event.topic).json_data(&event.data) {
        Ok(sse) => Some(sse),
        Err(err) => {
            tracing::warn!(topic = %event.topic, error = %err, "failed to encode event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::pin_mut;

    #[tokio::test]
    async fn stream_yields_published_events() {
        let events = EventBus::new(4);
        let stream = event_stream(&events);
        pin_mut!(stream);

        events.success("Album Trip created");

        let frame = stream.next().await;
        assert!(matches!(frame, Some(Ok(_))));
    }
}
