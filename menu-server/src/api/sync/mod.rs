//! Sync API Module
//!
//! 轮询配置下发与全量推送流。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sync", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/config", get(handler::config))
        .route("/subscribe", get(handler::subscribe))
}
