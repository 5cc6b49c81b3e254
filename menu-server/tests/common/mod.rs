//! Shared test fixtures
//!
//! 所有集成测试使用内存数据库，无需外部依赖。

#![allow(dead_code)]

use menu_server::core::{Config, ServerState};
use menu_server::db::models::{MenuItemCreate, OrderCreate, OrderItemInput};
use menu_server::db::repository::MenuItemRepository;

/// Fresh server state backed by an in-memory store
pub async fn test_state() -> ServerState {
    let config = Config::with_overrides("/tmp/menu-server-test", 0);
    ServerState::initialize_in_memory(&config).await
}

/// One cart line
pub fn line(name: &str, unit_price: i64, quantity: i64) -> OrderItemInput {
    OrderItemInput {
        menu_item: None,
        name: name.to_string(),
        unit_price,
        quantity,
    }
}

/// A cart with the given lines and no table / customer info
pub fn cart(items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        items,
        table_id: None,
        table_label: None,
        customer_name: None,
        customer_phone: None,
        note: None,
        kot_id: None,
        coupon: None,
    }
}

/// The canonical scenario cart: Pizza ×2 @ 200
pub fn pizza_cart() -> OrderCreate {
    cart(vec![line("Pizza", 200, 2)])
}

/// Seed a menu item and return its record id string
pub async fn seed_menu_item(state: &ServerState, name: &str, price: i64, stock: i64) -> String {
    let repo = MenuItemRepository::new(state.get_db());
    let item = repo
        .create(MenuItemCreate {
            name: name.to_string(),
            price,
            stock,
            low_stock_threshold: None,
        })
        .await
        .expect("seed menu item");
    item.id.expect("created item has id").to_string()
}
