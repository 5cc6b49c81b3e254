//! Sync channel payloads
//!
//! 资源变更同步信号：服务端在每次资源变更后广播，前端据此刷新。
//!
//! The push channel is a latency optimization only — every frontend also
//! polls, so a dropped or never-delivered payload is not a correctness
//! problem.

mod payload;

pub use payload::{BusMessage, EventType, NotificationPayload, SyncAction, SyncPayload};
