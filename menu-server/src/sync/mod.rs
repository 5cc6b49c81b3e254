//! Change Propagation
//!
//! 双通道同步：观察者以固定间隔轮询作为正确性基线，推送通道只负责降低
//! 延迟。轮询间隔由配置下发并被钳制在 1–5 秒。
//!
//! - [`SyncBus`]: in-process broadcast of resource change signals
//! - [`OrderWatcher`]: per-observer push subscriptions (bus + live query)

mod bus;
mod watcher;

pub use bus::SyncBus;
pub use watcher::{OrderSubscription, OrderWatcher};
