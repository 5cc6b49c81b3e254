//! Order Model
//!
//! 订单主表：行项目在下单时快照入库，之后菜单变更不影响历史订单。
//! Status / payment fields are the source of truth that every observer
//! (kitchen dashboard, customer bill page) converges on.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, PaymentMethod, PaymentStatus, PaymentView};
use surrealdb::RecordId;
use validator::Validate;

// =============================================================================
// Order (主表)
// =============================================================================

/// One snapshot line of an order
///
/// `name` and `unit_price` are frozen copies taken at placement time,
/// not live references into the menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Menu item record id ("menu_item:xyz"), kept for stock consumption;
    /// optional so ad-hoc lines survive menu deletions
    #[serde(default)]
    pub menu_item: Option<String>,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub items: Vec<OrderItem>,
    pub total_quantity: i64,
    pub total_price: i64,
    #[serde(default)]
    pub discount: Option<i64>,
    pub final_price: i64,
    /// Dining table record id ("dining_table:xyz")
    #[serde(default)]
    pub table_id: Option<String>,
    /// Legacy free-text table label (pre-QR menus wrote "Table 4" here)
    #[serde(default)]
    pub table_label: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Loosely-coupled kitchen order ticket reference
    #[serde(default)]
    pub kot_id: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Set iff payment_status == paid
    #[serde(default)]
    pub paid_at: Option<i64>,
    /// Set iff status == served
    #[serde(default)]
    pub completed_at: Option<i64>,
    /// NEW-badge flag; staff views flip it true on first open
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub seen_by_admin: bool,
    /// Optimistic-concurrency counter, incremented by every mutation
    #[serde(default)]
    pub revision: u64,
    pub created_at: i64,
}

impl Order {
    /// Record id as "order:xyz" string
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Derive the customer-facing payment view from the persisted fields
    pub fn payment_view(&self) -> PaymentView {
        PaymentView::derive(self.payment_status, self.payment_method, self.paid_at)
    }

    /// Check the field-coupling invariants of the record
    ///
    /// Used by tests after every mutation sequence; returns the first
    /// violated rule. `unpaid + upi` is legal (awaiting the customer
    /// confirmation); `unpaid + cash` and any method in `cancelled` are not.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.payment_status == PaymentStatus::Cancelled && self.payment_method.is_some() {
            return Err("payment_method must be null while payment_status is cancelled".into());
        }
        if self.payment_status == PaymentStatus::Unpaid
            && self.payment_method == Some(PaymentMethod::Cash)
        {
            return Err("cash selection cannot remain unpaid".into());
        }
        if (self.payment_status == PaymentStatus::Paid) != self.paid_at.is_some() {
            return Err("paid_at must be set iff payment_status is paid".into());
        }
        if (self.status == OrderStatus::Served) != self.completed_at.is_some() {
            return Err("completed_at must be set iff status is served".into());
        }
        Ok(())
    }
}

// =============================================================================
// API Request Types
// =============================================================================

/// One cart line as submitted by the customer frontend
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[serde(default)]
    pub menu_item: Option<String>,
    #[validate(length(min = 1, message = "item name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0, message = "unit_price must not be negative"))]
    pub unit_price: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

/// Coupon reference submitted with an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponRef {
    pub phone: String,
    pub code: String,
}

/// Create order payload
///
/// The item list is the finalized client-side cart; the server snapshots
/// it verbatim and computes the aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(
        length(min = 1, message = "order must contain at least one item"),
        nested
    )]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub table_label: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub kot_id: Option<String>,
    #[serde(default)]
    pub coupon: Option<CouponRef>,
}

impl OrderCreate {
    /// Snapshot the cart lines, computing per-line totals
    pub fn snapshot_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|line| OrderItem {
                menu_item: line.menu_item.clone(),
                name: line.name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_total: line.unit_price * line.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order() -> Order {
        Order {
            id: None,
            items: vec![],
            total_quantity: 0,
            total_price: 0,
            discount: None,
            final_price: 0,
            table_id: None,
            table_label: None,
            customer_name: None,
            customer_phone: None,
            note: None,
            kot_id: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            paid_at: None,
            completed_at: None,
            seen_by_admin: false,
            revision: 0,
            created_at: 0,
        }
    }

    #[test]
    fn snapshot_computes_line_totals() {
        let create = OrderCreate {
            items: vec![OrderItemInput {
                menu_item: None,
                name: "Pizza".into(),
                unit_price: 200,
                quantity: 2,
            }],
            table_id: None,
            table_label: None,
            customer_name: None,
            customer_phone: None,
            note: None,
            kot_id: None,
            coupon: None,
        };
        let items = create.snapshot_items();
        assert_eq!(items[0].line_total, 400);
    }

    #[test]
    fn invariants_catch_method_surviving_cancellation() {
        let mut order = base_order();
        order.payment_status = PaymentStatus::Cancelled;
        order.payment_method = Some(PaymentMethod::Upi);
        assert!(order.check_invariants().is_err());
    }

    #[test]
    fn invariants_allow_upi_awaiting_confirmation() {
        let mut order = base_order();
        order.payment_method = Some(PaymentMethod::Upi);
        assert!(order.check_invariants().is_ok());

        // Cash never lingers in unpaid
        order.payment_method = Some(PaymentMethod::Cash);
        assert!(order.check_invariants().is_err());
    }

    #[test]
    fn invariants_catch_orphan_paid_at() {
        let mut order = base_order();
        order.paid_at = Some(1);
        assert!(order.check_invariants().is_err());
    }

    #[test]
    fn invariants_accept_fresh_order() {
        assert!(base_order().check_invariants().is_ok());
    }
}
