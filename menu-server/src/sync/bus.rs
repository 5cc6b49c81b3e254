//! 同步总线
//!
//! # 架构
//!
//! ```text
//! mutation handler ──▶ publish() ──▶ broadcast::Sender<BusMessage>
//!                                          │
//!                         ┌────────────────┼────────────────┐
//!                         ▼                ▼                ▼
//!                   OrderWatcher     /api/sync SSE     (future observers)
//! ```
//!
//! The bus is the in-process leg of the push channel. It is best-effort by
//! contract: zero subscribers is not an error, and a lagging subscriber
//! simply misses messages — every observer also polls.

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out for resource change signals
#[derive(Debug)]
pub struct SyncBus {
    tx: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
}

impl SyncBus {
    /// Create a bus with the default channel capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with the given channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息到所有订阅者
    ///
    /// Returns the number of subscribers that received the message;
    /// zero observers is a normal condition, not an error.
    pub fn publish(&self, msg: BusMessage) -> usize {
        self.tx.send(msg).unwrap_or(0)
    }

    /// 订阅总线广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭：取消所有挂在总线上的长生命周期任务
    pub fn shutdown(&self) {
        tracing::info!("Shutting down sync bus");
        self.shutdown_token.cancel();
    }
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{SyncAction, SyncPayload};

    fn sync_msg(id: &str) -> BusMessage {
        BusMessage::sync(&SyncPayload {
            resource: "order".into(),
            version: 1,
            action: SyncAction::Updated,
            id: id.into(),
            data: None,
        })
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let bus = SyncBus::new();
        assert_eq!(bus.publish(sync_msg("order:a")), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_published_messages() {
        let bus = SyncBus::new();
        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(sync_msg("order:a")), 1);
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.as_sync().unwrap().id, "order:a");
    }
}
