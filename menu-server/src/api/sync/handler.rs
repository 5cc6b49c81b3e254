//! Sync API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};

/// Polling parameters handed to every observer
#[derive(Debug, Serialize)]
pub struct SyncConfig {
    /// Poll this often; the guaranteed staleness bound (clamped 1–5 s)
    pub poll_interval_ms: u64,
    /// Whether the store-level push channel is on (informational — clients
    /// must not change behavior based on it)
    pub push_enabled: bool,
}

/// GET /api/sync/config - 轮询参数
pub async fn config(State(state): State<ServerState>) -> Json<AppResponse<SyncConfig>> {
    ok(SyncConfig {
        poll_interval_ms: state.config.poll_interval_ms,
        push_enabled: state.config.push_enabled,
    })
}

/// GET /api/sync/subscribe - 全量推送流 (后厨看板)
///
/// Streams every bus message: order/menu/table sync signals plus
/// new-order notifications. Best-effort; the dashboard polls regardless.
pub async fn subscribe(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    let Ok(event) = Event::default()
                        .event(msg.event_type.to_string())
                        .json_data(&msg)
                    else {
                        continue;
                    };
                    return Some((Ok::<_, Infallible>(event), rx));
                }
                // Slow consumer: skip what was lost, polling covers the gap
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
