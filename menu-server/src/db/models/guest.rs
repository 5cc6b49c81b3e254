//! Guest / Coupon Model
//!
//! 顾客档案按手机号索引；优惠券一次性使用，核销后移入历史。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// One-time-use discount attached to a guest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub code: String,
    pub amount: i64,
    pub active: bool,
    pub issued_at: i64,
}

/// Guest profile keyed by phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guest {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Currently redeemable coupon, at most one
    #[serde(default)]
    pub coupon: Option<Coupon>,
    /// Consumed coupons, kept for history
    #[serde(default)]
    pub coupon_history: Vec<Coupon>,
    pub created_at: i64,
}

/// Upsert guest payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestUpsert {
    #[validate(length(min = 4, message = "phone must be at least 4 characters"))]
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issue coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponIssue {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
}
