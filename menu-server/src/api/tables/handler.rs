//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Order};
use crate::db::repository::DiningTableRepository;
use crate::orders::OrderService;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::message::SyncAction;

const RESOURCE: &str = "dining_table";

/// GET /api/tables - 获取所有桌台
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<DiningTable>>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_all().await?;
    Ok(ok(tables))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(ok(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(payload).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, &table_id(&table), Some(&table));
    Ok(ok(table))
}

/// PUT /api/tables/:id - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.update(&id, payload).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, &table_id(&table), Some(&table));
    Ok(ok(table))
}

/// DELETE /api/tables/:id - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<serde_json::Value>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    repo.delete(&id).await?;

    state.broadcast_sync::<DiningTable>(RESOURCE, SyncAction::Deleted, &id, None);
    Ok(ok(serde_json::json!({ "deleted": true })))
}

/// POST /api/tables/:id/bind - 扫码绑定新会话
///
/// 轮换 session token，旧会话随之失效。
pub async fn bind_session(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.bind_session(&id).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, &table_id(&table), Some(&table));
    Ok(ok_with_message(table, "Session bound"))
}

/// GET /api/tables/:id/orders - 桌台当前订单 (按时间倒序)
pub async fn orders_for_table(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = OrderService::new(state).find_by_table(&id).await?;
    Ok(ok(orders))
}

fn table_id(table: &DiningTable) -> String {
    table.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}
