//! Guest API Module
//!
//! 顾客档案与一次性优惠券发放。核销在下单时进行。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/guests", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::upsert))
        .route("/{phone}", get(handler::get_by_phone))
        .route("/{phone}/coupon", post(handler::issue_coupon))
}
