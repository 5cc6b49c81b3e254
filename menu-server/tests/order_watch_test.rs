//! Change propagation integration tests
//!
//! 推送订阅收到变更、断开即释放资源、拒单结束流。
//! 正确性基线是轮询，这里只验证推送通道自身的行为。

mod common;

use std::time::Duration;

use common::{pizza_cart, test_state};
use menu_server::orders::OrderService;
use shared::models::OrderStatus;
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait until the watcher's active task count drains to `expected`
async fn wait_for_active(state: &menu_server::ServerState, expected: usize) {
    for _ in 0..200 {
        if state.watcher.active_subscriptions() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "active subscriptions stuck at {} (expected {})",
        state.watcher.active_subscriptions(),
        expected
    );
}

#[tokio::test]
async fn subscriber_receives_pushed_mutations() {
    let state = test_state().await;
    let service = OrderService::new(state.clone());

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();

    let mut subscription = state.watcher.subscribe(&id).await;

    service
        .set_status(&id, OrderStatus::Preparing, None)
        .await
        .unwrap();

    let pushed = timeout(RECV_TIMEOUT, subscription.recv())
        .await
        .expect("push within timeout")
        .expect("stream still open");
    assert_eq!(pushed.id_string(), id);
    assert_eq!(pushed.status, OrderStatus::Preparing);
}

#[tokio::test]
async fn subscriber_only_sees_its_own_order() {
    let state = test_state().await;
    let service = OrderService::new(state.clone());

    let watched = service.place_order(pizza_cart()).await.unwrap();
    let other = service.place_order(pizza_cart()).await.unwrap();
    let watched_id = watched.id_string();

    let mut subscription = state.watcher.subscribe(&watched_id).await;

    // Mutate the other order first, then the watched one
    service
        .set_status(&other.id_string(), OrderStatus::Preparing, None)
        .await
        .unwrap();
    service
        .set_status(&watched_id, OrderStatus::Ready, None)
        .await
        .unwrap();

    let pushed = timeout(RECV_TIMEOUT, subscription.recv())
        .await
        .expect("push within timeout")
        .expect("stream still open");
    assert_eq!(pushed.id_string(), watched_id);
    assert_eq!(pushed.status, OrderStatus::Ready);
}

#[tokio::test]
async fn decline_ends_the_stream() {
    let state = test_state().await;
    let service = OrderService::new(state.clone());

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();

    let mut subscription = state.watcher.subscribe(&id).await;
    service.decline(&id).await.unwrap();

    let end = timeout(RECV_TIMEOUT, subscription.recv())
        .await
        .expect("stream should close within timeout");
    assert!(end.is_none());
}

#[tokio::test]
async fn dropping_subscriptions_releases_all_resources() {
    let state = test_state().await;
    let service = OrderService::new(state.clone());

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();

    let sub_a = state.watcher.subscribe(&id).await;
    let sub_b = state.watcher.subscribe(&id).await;
    assert_eq!(state.watcher.active_subscriptions(), 2);

    // Observer disconnect == subscription drop; the forwarding tasks and
    // their change watchers must end deterministically
    drop(sub_a);
    wait_for_active(&state, 1).await;

    drop(sub_b);
    wait_for_active(&state, 0).await;
}

#[tokio::test]
async fn bus_shutdown_ends_every_subscription() {
    let state = test_state().await;
    let service = OrderService::new(state.clone());

    let order = service.place_order(pizza_cart()).await.unwrap();
    let mut subscription = state.watcher.subscribe(&order.id_string()).await;

    state.shutdown();

    let end = timeout(RECV_TIMEOUT, subscription.recv())
        .await
        .expect("stream should close on shutdown");
    assert!(end.is_none());
    wait_for_active(&state, 0).await;
}
