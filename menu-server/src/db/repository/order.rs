//! Order Repository
//!
//! Creation snapshots the cart; every later mutation is a targeted partial
//! update of the status / payment / seen fields plus a `revision` bump.
//! Callers may pass `expected_revision` to turn last-write-wins into a
//! compare-and-swap (`Conflict` on mismatch, then re-fetch and retry).

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate};
use crate::orders::payment::PaymentState;
use crate::orders::status;
use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "order";

/// Filters for the staff order list
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, serde::Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> RepoResult<RecordId> {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid order ID format: {}", id)))
    }

    /// Create an order from a finalized cart
    ///
    /// Item names and prices are frozen here; `discount` comes from a
    /// consumed coupon, if any.
    pub async fn create(&self, data: &OrderCreate, discount: Option<i64>) -> RepoResult<Order> {
        let items = data.snapshot_items();
        let total_quantity: i64 = items.iter().map(|i| i.quantity).sum();
        let total_price: i64 = items.iter().map(|i| i.line_total).sum();
        let final_price = (total_price - discount.unwrap_or(0)).max(0);

        let order = Order {
            id: None,
            items,
            total_quantity,
            total_price,
            discount,
            final_price,
            table_id: data.table_id.clone(),
            table_label: data.table_label.clone(),
            customer_name: data.customer_name.clone(),
            customer_phone: data.customer_phone.clone(),
            note: data.note.clone(),
            kot_id: data.kot_id.clone(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            paid_at: None,
            completed_at: None,
            seen_by_admin: false,
            revision: 0,
            created_at: now_millis(),
        };

        let created: Option<Order> = self
            .base
            .db()
            .create(ORDER_TABLE)
            .content(order)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = Self::parse_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Fetch or fail with NotFound
    pub async fn get(&self, id: &str) -> RepoResult<Order> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// List orders by recency with optional status / payment filters
    ///
    /// Returns the page plus the total matching count, so the caller can
    /// compute `has_more = skip + returned < total`.
    pub async fn list(
        &self,
        filter: &OrderListFilter,
        limit: u32,
        skip: u32,
    ) -> RepoResult<(Vec<Order>, u64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.payment_status.is_some() {
            conditions.push("payment_status = $payment_status");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query_str = format!(
            "SELECT * FROM order{w} ORDER BY created_at DESC LIMIT {limit} START {skip};
             SELECT count() AS count FROM order{w} GROUP ALL;",
            w = where_clause,
        );

        let mut query = self.base.db().query(query_str);
        if let Some(s) = filter.status {
            query = query.bind(("status", s));
        }
        if let Some(p) = filter.payment_status {
            query = query.bind(("payment_status", p));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);
        Ok((orders, total))
    }

    /// Orders bound to a dining table, newest first
    pub async fn find_by_table(&self, table_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE table_id = $table_id ORDER BY created_at DESC")
            .bind(("table_id", table_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Apply a status transition
    ///
    /// Forward-only; equal-state re-sets are accepted. Flips
    /// `seen_by_admin` and stamps `completed_at` on entry into `served`.
    pub async fn set_status(
        &self,
        id: &str,
        new_status: OrderStatus,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.get(id).await?;
        status::validate_transition(order.status, new_status)
            .map_err(|e| RepoError::Conflict(e.to_string()))?;

        let completed_at: Option<i64> = (new_status == OrderStatus::Served).then(now_millis);

        let updated = self
            .partial_update(
                &order,
                "status = $status, seen_by_admin = true, completed_at = $completed_at",
                expected_revision,
                vec![
                    ("status", serde_json::json!(new_status)),
                    ("completed_at", serde_json::json!(completed_at)),
                ],
            )
            .await?;
        Ok(updated)
    }

    /// Staff decline — hard delete, only while still pending
    pub async fn decline(&self, id: &str) -> RepoResult<()> {
        let order = self.get(id).await?;
        if !status::can_decline(order.status) {
            return Err(RepoError::Conflict(format!(
                "Order {} has already been accepted (status {}) and cannot be declined",
                id, order.status
            )));
        }
        let thing = Self::parse_id(id)?;
        let _: Option<Order> = self.base.db().delete(thing).await?;
        Ok(())
    }

    /// Flip the NEW badge on first staff open
    pub async fn mark_seen(&self, id: &str) -> RepoResult<Order> {
        let order = self.get(id).await?;
        self.partial_update(&order, "seen_by_admin = true", None, Vec::new())
            .await
    }

    // ========== Payment transitions ==========

    /// Customer picks UPI or cash
    pub async fn select_payment_method(
        &self,
        id: &str,
        method: PaymentMethod,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.get(id).await?;
        let next = payment_state(&order)
            .select_method(method)
            .map_err(|e| RepoError::Conflict(e.to_string()))?;
        self.write_payment(&order, next, expected_revision).await
    }

    /// Customer-side "I have paid" (UPI)
    pub async fn confirm_paid(&self, id: &str, expected_revision: Option<u64>) -> RepoResult<Order> {
        let order = self.get(id).await?;
        let next = payment_state(&order)
            .confirm_paid()
            .map_err(|e| RepoError::Conflict(e.to_string()))?;
        self.write_payment(&order, next, expected_revision).await
    }

    /// Staff verification override
    pub async fn mark_paid(&self, id: &str, expected_revision: Option<u64>) -> RepoResult<Order> {
        let order = self.get(id).await?;
        let next = payment_state(&order).mark_paid(now_millis());
        self.write_payment(&order, next, expected_revision).await
    }

    /// Staff cancellation — clears the method so the customer can restart
    pub async fn cancel_payment(
        &self,
        id: &str,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.get(id).await?;
        let next = payment_state(&order)
            .cancel()
            .map_err(|e| RepoError::Conflict(e.to_string()))?;
        self.write_payment(&order, next, expected_revision).await
    }

    /// Force payment status back to pending
    pub async fn mark_payment_pending(
        &self,
        id: &str,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.get(id).await?;
        let next = payment_state(&order).mark_pending();
        self.write_payment(&order, next, expected_revision).await
    }

    async fn write_payment(
        &self,
        order: &Order,
        next: PaymentState,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        self.partial_update(
            order,
            "payment_status = $payment_status, payment_method = $payment_method, paid_at = $paid_at",
            expected_revision,
            vec![
                ("payment_status", serde_json::json!(next.status)),
                ("payment_method", serde_json::json!(next.method)),
                ("paid_at", serde_json::json!(next.paid_at)),
            ],
        )
        .await
    }

    /// Targeted partial update with revision bump
    ///
    /// With `expected_revision`, the update becomes conditional and an
    /// empty result means the record moved underneath the caller.
    async fn partial_update(
        &self,
        order: &Order,
        set_clause: &str,
        expected_revision: Option<u64>,
        bindings: Vec<(&'static str, serde_json::Value)>,
    ) -> RepoResult<Order> {
        let thing = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Order record has no id".to_string()))?;

        let guard = match expected_revision {
            Some(_) => " WHERE revision = $expected_revision",
            None => "",
        };
        let query_str =
            format!("UPDATE $thing SET {set_clause}, revision += 1{guard} RETURN AFTER");

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("thing", thing.clone()));
        if let Some(rev) = expected_revision {
            query = query.bind(("expected_revision", rev));
        }
        for (name, value) in bindings {
            query = query.bind((name, value));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        match orders.into_iter().next() {
            Some(order) => Ok(order),
            None if expected_revision.is_some() => Err(RepoError::Conflict(format!(
                "Order {} was modified concurrently (stale revision)",
                thing
            ))),
            None => Err(RepoError::NotFound(format!("Order {} not found", thing))),
        }
    }
}

/// The payment-relevant slice of an order record
fn payment_state(order: &Order) -> PaymentState {
    PaymentState {
        status: order.payment_status,
        method: order.payment_method,
        paid_at: order.paid_at,
    }
}
