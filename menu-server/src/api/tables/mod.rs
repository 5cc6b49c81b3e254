//! Dining Table API 模块
//!
//! 桌台管理与扫码会话绑定。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            put(handler::update)
                .get(handler::get_by_id)
                .delete(handler::delete),
        )
        .route("/{id}/bind", post(handler::bind_session))
        .route("/{id}/orders", get(handler::orders_for_table))
}
