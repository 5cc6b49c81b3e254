//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{MenuItem, MenuItemCreate};
use crate::db::repository::MenuItemRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::message::SyncAction;

const RESOURCE: &str = "menu_item";

/// POST /api/menu-items - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.create(payload).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Created, &item_id(&item), Some(&item));
    Ok(ok(item))
}

/// GET /api/menu-items - 获取所有在售菜品
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<MenuItem>>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let items = repo.find_all().await?;
    Ok(ok(items))
}

/// GET /api/menu-items/:id - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.get(&id).await?;
    Ok(ok(item))
}

/// Stock adjustment request
///
/// Exactly one of `delta` (signed admin adjustment) or `reduce_by`
/// (positive consumption) must be present.
#[derive(Debug, Deserialize)]
pub struct StockAdjustRequest {
    #[serde(default)]
    pub delta: Option<i64>,
    #[serde(default)]
    pub reduce_by: Option<i64>,
}

/// PUT /api/menu-items/:id/stock - 调整库存 (下限 0)
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustRequest>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let item = match (payload.delta, payload.reduce_by) {
        (Some(delta), None) => repo.adjust_stock(&id, delta).await?,
        (None, Some(qty)) => repo.reduce_stock(&id, qty).await?,
        _ => {
            return Err(AppError::validation(
                "Provide exactly one of 'delta' or 'reduce_by'",
            ));
        }
    };

    state.broadcast_sync(RESOURCE, SyncAction::Updated, &item_id(&item), Some(&item));
    Ok(ok(item))
}

fn item_id(item: &MenuItem) -> String {
    item.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}
