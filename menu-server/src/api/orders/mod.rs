//! Order API Module
//!
//! 下单、订单查询、状态流转、支付流转、推送订阅。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Placement and queries
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id).delete(handler::decline))
        // Status lifecycle
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/seen", post(handler::mark_seen))
        // Payment flow
        .route("/{id}/payment", get(handler::payment_view))
        .route("/{id}/payment/method", put(handler::select_payment_method))
        .route("/{id}/payment/confirm", post(handler::confirm_paid))
        .route("/{id}/payment/paid", post(handler::mark_paid))
        .route("/{id}/payment/cancel", post(handler::cancel_payment))
        .route("/{id}/payment/pending", post(handler::mark_payment_pending))
        // Push channel (best-effort; observers poll regardless)
        .route("/{id}/subscribe", get(handler::subscribe))
}
