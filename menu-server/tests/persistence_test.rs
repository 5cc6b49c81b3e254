//! Durability smoke test
//!
//! 订单历史无限期保留：重启后仍可读取。走 RocksDB 路径而非内存引擎。

mod common;

use common::pizza_cart;
use menu_server::core::{Config, ServerState};
use menu_server::orders::OrderService;
use shared::models::{OrderStatus, PaymentStatus};

#[tokio::test]
async fn orders_survive_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);

    let order_id = {
        let state = ServerState::initialize(&config).await;
        let service = OrderService::new(state.clone());
        let order = service.place_order(pizza_cart()).await.unwrap();
        let id = order.id_string();
        service
            .set_status(&id, OrderStatus::Preparing, None)
            .await
            .unwrap();
        state.shutdown();
        id
        // state drops here, releasing the store
    };

    // Give the embedded store a moment to release its lock
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let state = ServerState::initialize(&config).await;
    let service = OrderService::new(state);
    let order = service.get(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.total_price, 400);
    order.check_invariants().unwrap();
}
