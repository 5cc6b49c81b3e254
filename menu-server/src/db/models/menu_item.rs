//! Menu Item Model
//!
//! 菜品条目，内嵌库存字段 (stock ledger)。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Menu item entity with embedded stock counters
///
/// `stock` never goes below zero; `out_of_stock` is recomputed and
/// persisted together with every stock write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub low_stock_threshold: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub out_of_stock: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
    pub created_at: i64,
}

impl MenuItem {
    /// Low-stock warning for the admin inventory view
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}
