//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 下单、状态流转、支付流转、推送订阅
//! - [`menu_items`] - 菜品与库存调整
//! - [`tables`] - 桌台管理与会话绑定
//! - [`guests`] - 顾客档案与优惠券
//! - [`sync`] - 轮询配置与全量推送流

pub mod guests;
pub mod health;
pub mod menu_items;
pub mod orders;
pub mod sync;
pub mod tables;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Compose the full application router
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(menu_items::router())
        .merge(tables::router())
        .merge(guests::router())
        .merge(sync::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
