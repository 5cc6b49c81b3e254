//! Guest API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{CouponIssue, Guest, GuestUpsert};
use crate::db::repository::GuestRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/guests - 登记顾客 (按手机号幂等)
pub async fn upsert(
    State(state): State<ServerState>,
    Json(payload): Json<GuestUpsert>,
) -> AppResult<Json<AppResponse<Guest>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = GuestRepository::new(state.db.clone());
    let guest = repo.upsert(payload).await?;
    Ok(ok(guest))
}

/// GET /api/guests/:phone - 查询顾客档案
pub async fn get_by_phone(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<AppResponse<Guest>>> {
    let repo = GuestRepository::new(state.db.clone());
    let guest = repo
        .find_by_phone(&phone)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Guest {} not found", phone)))?;
    Ok(ok(guest))
}

/// POST /api/guests/:phone/coupon - 发放一次性优惠券
pub async fn issue_coupon(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
    Json(payload): Json<CouponIssue>,
) -> AppResult<Json<AppResponse<Guest>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = GuestRepository::new(state.db.clone());
    let guest = repo.issue_coupon(&phone, payload).await?;
    Ok(ok(guest))
}
