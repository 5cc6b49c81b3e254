//! Health API Module

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - 健康检查
async fn health() -> Json<AppResponse<Health>> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
