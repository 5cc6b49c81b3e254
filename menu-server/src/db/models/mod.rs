//! Database Models
//!
//! SurrealDB entities and API request payloads.

pub mod serde_helpers;

mod dining_table;
mod guest;
mod menu_item;
mod order;

pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate};
pub use guest::{Coupon, CouponIssue, Guest, GuestUpsert};
pub use menu_item::{MenuItem, MenuItemCreate};
pub use order::{CouponRef, Order, OrderCreate, OrderItem, OrderItemInput};
