use crate::models::preferences::ThemeUpdate;
use crate::web::api::AppState;
use axum::{
    extract::State,
    response::{sse::Event, Sse},
};
use futures::stream::{self, Stream};
use log::debug;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio_stream::StreamExt as _;

// Turns a broadcast receiver into an SSE stream; lagged receivers emit a ping
// and keep going, a closed channel ends the stream.
fn broadcast_stream<T, U, F>(
    rx: Receiver<T>,
    to_payload: F,
) -> impl Stream<Item = Result<Event, axum::Error>>
where
    T: Clone + Send + 'static,
    U: Serialize,
    F: Fn(T) -> U + Copy + Send + 'static,
{
    stream::unfold(rx, move |mut rx| async move {
        match rx.recv().await {
            Ok(message) => {
                let event = Event::default().json_data(to_payload(message));
                Some((event, rx))
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("SSE subscriber lagged, skipped {} events", skipped);
                let event = Event::default().event("ping").data("");
                Some((Ok(event), rx))
            }
            Err(RecvError::Closed) => None,
        }
    })
}

fn with_keep_alive<S>(stream: S) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    S: Stream<Item = Result<Event, axum::Error>> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive-text"),
    )
}

// Handler for panel view events; the current view is sent first
pub async fn preferences_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.panel.subscribe();
    let initial = stream::once(futures::future::ready(
        Event::default().json_data(state.panel.view()),
    ));
    with_keep_alive(initial.chain(broadcast_stream(rx, |view| view)))
}

// Handler for theme change events
pub async fn theme_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.theme.subscribe();
    let initial = stream::once(futures::future::ready(Event::default().json_data(
        ThemeUpdate {
            theme: state.theme.mode(),
        },
    )));
    let updates = broadcast_stream(rx, |theme| ThemeUpdate { theme });
    with_keep_alive(initial.chain(updates))
}
