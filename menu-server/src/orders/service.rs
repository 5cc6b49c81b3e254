//! Order service
//!
//! Orchestrates the order lifecycle: repository mutations, the stock
//! side effects of placement, coupon consumption, and change broadcasts.
//! API handlers stay thin wrappers over this service.

use shared::message::SyncAction;
use shared::models::{OrderStatus, PaymentMethod};

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate};
use crate::db::repository::{
    GuestRepository, MenuItemRepository, OrderListFilter, OrderRepository, RepoResult,
};

const RESOURCE: &str = "order";

#[derive(Clone)]
pub struct OrderService {
    state: ServerState,
    orders: OrderRepository,
    menu_items: MenuItemRepository,
    guests: GuestRepository,
}

impl OrderService {
    pub fn new(state: ServerState) -> Self {
        let db = state.get_db();
        Self {
            orders: OrderRepository::new(db.clone()),
            menu_items: MenuItemRepository::new(db.clone()),
            guests: GuestRepository::new(db),
            state,
        }
    }

    /// Place an order from a finalized cart
    ///
    /// 下单流程：核销优惠券 (如有) → 建单 (快照行项目) → 扣减库存 →
    /// 广播变更与新订单提醒。
    ///
    /// Stock consumption is per-line and best-effort: a line whose item
    /// vanished is logged and skipped, never failing the placed order.
    pub async fn place_order(&self, data: OrderCreate) -> RepoResult<Order> {
        // Coupon first: a non-redeemable coupon must fail the request
        // before any record is written.
        let discount = match &data.coupon {
            Some(coupon) => Some(
                self.guests
                    .consume_coupon(&coupon.phone, &coupon.code)
                    .await?,
            ),
            None => None,
        };

        let order = self.orders.create(&data, discount).await?;
        let order_id = order.id_string();

        // Consume stock for each snapshot line that references a menu item
        for item in &order.items {
            let Some(menu_item_id) = &item.menu_item else {
                continue;
            };
            match self.menu_items.reduce_stock(menu_item_id, item.quantity).await {
                Ok(updated) => {
                    self.state.broadcast_sync(
                        "menu_item",
                        SyncAction::Updated,
                        menu_item_id,
                        Some(&updated),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Stock consumption failed for {} on order {}: {}",
                        menu_item_id,
                        order_id,
                        e
                    );
                }
            }
        }

        self.state
            .broadcast_sync(RESOURCE, SyncAction::Created, &order_id, Some(&order));
        self.state.notify(
            "New order",
            &format!(
                "{} item(s), {}",
                order.total_quantity,
                order
                    .table_label
                    .clone()
                    .or(order.table_id.clone())
                    .unwrap_or_else(|| "takeaway".into())
            ),
            Some(serde_json::json!({ "order_id": order_id })),
        );

        Ok(order)
    }

    pub async fn get(&self, id: &str) -> RepoResult<Order> {
        self.orders.get(id).await
    }

    pub async fn list(
        &self,
        filter: &OrderListFilter,
        limit: u32,
        skip: u32,
    ) -> RepoResult<(Vec<Order>, u64)> {
        self.orders.list(filter, limit, skip).await
    }

    pub async fn find_by_table(&self, table_id: &str) -> RepoResult<Vec<Order>> {
        self.orders.find_by_table(table_id).await
    }

    /// Kitchen advances the order status
    pub async fn set_status(
        &self,
        id: &str,
        status: OrderStatus,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.orders.set_status(id, status, expected_revision).await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    /// Staff decline of a still-pending order — hard delete
    pub async fn decline(&self, id: &str) -> RepoResult<()> {
        self.orders.decline(id).await?;
        self.state
            .broadcast_sync::<Order>(RESOURCE, SyncAction::Deleted, id, None);
        Ok(())
    }

    /// Staff opened the order — clear the NEW badge
    pub async fn mark_seen(&self, id: &str) -> RepoResult<Order> {
        let order = self.orders.mark_seen(id).await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    // ========== Payment flow ==========

    pub async fn select_payment_method(
        &self,
        id: &str,
        method: PaymentMethod,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self
            .orders
            .select_payment_method(id, method, expected_revision)
            .await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    pub async fn confirm_paid(&self, id: &str, expected_revision: Option<u64>) -> RepoResult<Order> {
        let order = self.orders.confirm_paid(id, expected_revision).await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    pub async fn mark_paid(&self, id: &str, expected_revision: Option<u64>) -> RepoResult<Order> {
        let order = self.orders.mark_paid(id, expected_revision).await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    pub async fn cancel_payment(
        &self,
        id: &str,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self.orders.cancel_payment(id, expected_revision).await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    pub async fn mark_payment_pending(
        &self,
        id: &str,
        expected_revision: Option<u64>,
    ) -> RepoResult<Order> {
        let order = self
            .orders
            .mark_payment_pending(id, expected_revision)
            .await?;
        self.broadcast_updated(&order);
        Ok(order)
    }

    fn broadcast_updated(&self, order: &Order) {
        self.state.broadcast_sync(
            RESOURCE,
            SyncAction::Updated,
            &order.id_string(),
            Some(order),
        );
    }
}
