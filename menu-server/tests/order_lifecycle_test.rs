//! Order lifecycle integration tests
//!
//! 覆盖状态机的前向流转、拒单、列表分页与乐观并发守卫。

mod common;

use common::{cart, line, pizza_cart, test_state};
use menu_server::db::repository::{OrderListFilter, RepoError};
use menu_server::orders::OrderService;
use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};

#[tokio::test]
async fn full_lifecycle_scenario() {
    let state = test_state().await;
    let service = OrderService::new(state);

    // Pizza ×2 @ 200 → 400
    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.total_quantity, 2);
    assert_eq!(order.total_price, 400);
    assert_eq!(order.final_price, 400);
    assert!(!order.seen_by_admin);
    order.check_invariants().unwrap();

    // Kitchen accepts
    let order = service
        .set_status(&id, OrderStatus::Preparing, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert!(order.seen_by_admin);
    assert!(order.completed_at.is_none());
    order.check_invariants().unwrap();

    // Customer picks cash → immediately pending
    let order = service
        .select_payment_method(&id, PaymentMethod::Cash, None)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    order.check_invariants().unwrap();

    // Staff verifies
    let order = service.mark_paid(&id, None).await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert!(order.paid_at.is_some());
    order.check_invariants().unwrap();

    // Served stamps completion
    let order = service
        .set_status(&id, OrderStatus::Served, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Served);
    assert!(order.completed_at.is_some());
    order.check_invariants().unwrap();
}

#[tokio::test]
async fn backward_transition_is_rejected() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();

    service
        .set_status(&id, OrderStatus::Ready, None)
        .await
        .unwrap();

    let err = service
        .set_status(&id, OrderStatus::Preparing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // The rejected transition left the record untouched
    let order = service.get(&id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Ready);
}

#[tokio::test]
async fn rejected_backward_move_keeps_completed_at() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();

    let order = service
        .set_status(&id, OrderStatus::Served, None)
        .await
        .unwrap();
    let completed_at = order.completed_at.unwrap();

    let err = service
        .set_status(&id, OrderStatus::Ready, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let order = service.get(&id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Served);
    assert_eq!(order.completed_at, Some(completed_at));
    order.check_invariants().unwrap();
}

#[tokio::test]
async fn decline_removes_pending_order_entirely() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let keep = service.place_order(pizza_cart()).await.unwrap();
    let declined = service
        .place_order(cart(vec![line("Tea", 30, 1)]))
        .await
        .unwrap();
    let declined_id = declined.id_string();

    service.decline(&declined_id).await.unwrap();

    // Gone from reads and lists
    let err = service.get(&declined_id).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let (orders, total) = service
        .list(&OrderListFilter::default(), 50, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert!(orders.iter().all(|o| o.id_string() != declined_id));
    assert_eq!(orders[0].id_string(), keep.id_string());
}

#[tokio::test]
async fn decline_is_blocked_once_accepted() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();
    service
        .set_status(&id, OrderStatus::Preparing, None)
        .await
        .unwrap();

    let err = service.decline(&id).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // Still there
    assert!(service.get(&id).await.is_ok());
}

#[tokio::test]
async fn unknown_order_fails_with_not_found() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let err = service
        .set_status("order:nope", OrderStatus::Preparing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let err = service.mark_paid("order:nope", None).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn list_pagination_reports_has_more() {
    let state = test_state().await;
    let service = OrderService::new(state);

    for i in 0..5 {
        service
            .place_order(cart(vec![line(&format!("Dish {}", i), 100, 1)]))
            .await
            .unwrap();
        // keep created_at strictly increasing for a stable recency order
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let filter = OrderListFilter::default();
    let (page1, total) = service.list(&filter, 2, 0).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(page1.len(), 2);
    // has_more contract: skip + returned < total
    assert!((0 + page1.len() as u64) < total);

    let (page3, total) = service.list(&filter, 2, 4).await.unwrap();
    assert_eq!(page3.len(), 1);
    assert!((4 + page3.len() as u64) >= total);

    // Newest first
    assert_eq!(page1[0].items[0].name, "Dish 4");
    assert_eq!(page3[0].items[0].name, "Dish 0");
}

#[tokio::test]
async fn list_filters_by_status_and_payment() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let a = service.place_order(pizza_cart()).await.unwrap();
    let b = service.place_order(pizza_cart()).await.unwrap();
    service
        .set_status(&a.id_string(), OrderStatus::Preparing, None)
        .await
        .unwrap();
    service.mark_paid(&b.id_string(), None).await.unwrap();

    let (orders, total) = service
        .list(
            &OrderListFilter {
                status: Some(OrderStatus::Preparing),
                payment_status: None,
            },
            50,
            0,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].id_string(), a.id_string());

    let (orders, total) = service
        .list(
            &OrderListFilter {
                status: None,
                payment_status: Some(PaymentStatus::Paid),
            },
            50,
            0,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].id_string(), b.id_string());
}

#[tokio::test]
async fn seen_flag_flips_on_first_staff_open() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let order = service.place_order(pizza_cart()).await.unwrap();
    assert!(!order.seen_by_admin);

    let order = service.mark_seen(&order.id_string()).await.unwrap();
    assert!(order.seen_by_admin);
}

#[tokio::test]
async fn stale_revision_guard_conflicts_without_side_effect() {
    let state = test_state().await;
    let service = OrderService::new(state);

    let order = service.place_order(pizza_cart()).await.unwrap();
    let id = order.id_string();
    assert_eq!(order.revision, 0);

    // Guarded update against the current revision succeeds
    let order = service
        .set_status(&id, OrderStatus::Preparing, Some(0))
        .await
        .unwrap();
    assert_eq!(order.revision, 1);

    // Replaying the same guard is now stale
    let err = service
        .set_status(&id, OrderStatus::Ready, Some(0))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // Re-fetch-and-retry is the documented recovery
    let current = service.get(&id).await.unwrap();
    assert_eq!(current.status, OrderStatus::Preparing);
    let order = service
        .set_status(&id, OrderStatus::Ready, Some(current.revision))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Ready);
}
