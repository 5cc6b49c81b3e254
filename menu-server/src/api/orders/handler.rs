//! Order API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate};
use crate::db::repository::OrderListFilter;
use crate::orders::OrderService;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{OrderStatus, PaymentMethod, PaymentView};
use shared::types::{Paginated, PaginationParams};

/// Query params for listing orders
///
/// Pagination fields are inlined: serde_urlencoded cannot deserialize
/// numbers through a flattened struct.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<shared::models::PaymentStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl ListQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = OrderService::new(state).place_order(payload).await?;
    Ok(ok(order))
}

/// GET /api/orders - 订单列表 (按下单时间倒序)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Paginated<Order>>>> {
    let filter = OrderListFilter {
        status: query.status,
        payment_status: query.payment_status,
    };
    let pagination = query.pagination();
    let (orders, total) = OrderService::new(state)
        .list(&filter, pagination.limit, pagination.skip())
        .await?;
    Ok(ok(Paginated::new(orders, total, &pagination)))
}

/// GET /api/orders/:id - 订单详情 (账单页轮询入口)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = OrderService::new(state).get(&id).await?;
    Ok(ok(order))
}

/// Set status request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

/// PUT /api/orders/:id/status - 后厨状态流转
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = OrderService::new(state)
        .set_status(&id, payload.status, payload.expected_revision)
        .await?;
    Ok(ok(order))
}

/// DELETE /api/orders/:id - 拒单 (仅 pending，硬删除)
pub async fn decline(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<serde_json::Value>>> {
    OrderService::new(state).decline(&id).await?;
    Ok(ok_with_message(
        serde_json::json!({ "deleted": true }),
        "Order declined",
    ))
}

/// POST /api/orders/:id/seen - 清除 NEW 角标
pub async fn mark_seen(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = OrderService::new(state).mark_seen(&id).await?;
    Ok(ok(order))
}

// ========== Payment flow ==========

/// GET /api/orders/:id/payment - 账单页支付视图
pub async fn payment_view(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<PaymentView>>> {
    let order = OrderService::new(state).get(&id).await?;
    Ok(ok(order.payment_view()))
}

/// Select payment method request
#[derive(Debug, Deserialize)]
pub struct SelectMethodRequest {
    pub method: PaymentMethod,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

/// PUT /api/orders/:id/payment/method - 顾客选择支付方式
pub async fn select_payment_method(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectMethodRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = OrderService::new(state)
        .select_payment_method(&id, payload.method, payload.expected_revision)
        .await?;
    Ok(ok(order))
}

/// Optional revision guard carried by the remaining payment operations
#[derive(Debug, Default, Deserialize)]
pub struct RevisionGuard {
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

/// POST /api/orders/:id/payment/confirm - 顾客 "我已支付" (UPI)
pub async fn confirm_paid(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<RevisionGuard>>,
) -> AppResult<Json<AppResponse<Order>>> {
    let guard = payload.map(|Json(g)| g).unwrap_or_default();
    let order = OrderService::new(state)
        .confirm_paid(&id, guard.expected_revision)
        .await?;
    Ok(ok(order))
}

/// POST /api/orders/:id/payment/paid - 店员核销
pub async fn mark_paid(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<RevisionGuard>>,
) -> AppResult<Json<AppResponse<Order>>> {
    let guard = payload.map(|Json(g)| g).unwrap_or_default();
    let order = OrderService::new(state)
        .mark_paid(&id, guard.expected_revision)
        .await?;
    Ok(ok(order))
}

/// POST /api/orders/:id/payment/cancel - 店员取消支付 (清空方式)
pub async fn cancel_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<RevisionGuard>>,
) -> AppResult<Json<AppResponse<Order>>> {
    let guard = payload.map(|Json(g)| g).unwrap_or_default();
    let order = OrderService::new(state)
        .cancel_payment(&id, guard.expected_revision)
        .await?;
    Ok(ok(order))
}

/// POST /api/orders/:id/payment/pending - 强制回到待核销
pub async fn mark_payment_pending(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<RevisionGuard>>,
) -> AppResult<Json<AppResponse<Order>>> {
    let guard = payload.map(|Json(g)| g).unwrap_or_default();
    let order = OrderService::new(state)
        .mark_payment_pending(&id, guard.expected_revision)
        .await?;
    Ok(ok(order))
}

// ========== Push channel ==========

/// GET /api/orders/:id/subscribe - 订单变更推送 (SSE)
///
/// Best-effort latency optimization; the bill page keeps polling either
/// way. The stream ends when the order is declined.
pub async fn subscribe(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // Unknown order: fail before opening a stream
    OrderService::new(state.clone()).get(&id).await?;

    let subscription = state.watcher.subscribe(&id).await;
    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let order = subscription.recv().await?;
        let event = Event::default().event("order").json_data(&order).ok()?;
        Some((Ok::<_, Infallible>(event), subscription))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
