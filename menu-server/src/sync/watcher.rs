//! Per-order push subscriptions
//!
//! 每个连接的观察者 (顾客账单页、后厨弹窗) 对应一个订阅任务，
//! 任务在观察者断开时必须立刻结束并释放底层资源。
//!
//! Each subscription forwards two sources into one channel:
//! - the in-process [`SyncBus`] (fires for every mutation handler), and
//! - a SurrealDB live query on the order table, when the storage tier
//!   supports it (best-effort: a failure downgrades to bus-only).
//!
//! Correctness never depends on this module — observers poll as the
//! guaranteed baseline, and the same record may arrive on both legs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use futures::stream::BoxStream;
use shared::message::EventType;
use surrealdb::engine::local::Db;
use surrealdb::{Action, Notification, Surreal};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use super::SyncBus;
use crate::db::models::Order;

const ORDER_TABLE: &str = "order";

/// Buffer of records queued per subscriber before backpressure drops them
const SUBSCRIPTION_BUFFER: usize = 32;

/// Decrements the active-subscription counter when the task ends
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A live feed of full order records for one order id
///
/// Dropping the subscription cancels the forwarding task and closes the
/// underlying live query.
pub struct OrderSubscription {
    rx: mpsc::Receiver<Order>,
    token: CancellationToken,
}

impl OrderSubscription {
    /// Next pushed record; `None` once the order is deleted or the
    /// watcher shuts down
    pub async fn recv(&mut self) -> Option<Order> {
        self.rx.recv().await
    }
}

impl Drop for OrderSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns and tracks per-observer forwarding tasks
#[derive(Clone)]
pub struct OrderWatcher {
    db: Surreal<Db>,
    bus: Arc<SyncBus>,
    push_enabled: bool,
    active: Arc<AtomicUsize>,
}

impl OrderWatcher {
    pub fn new(db: Surreal<Db>, bus: Arc<SyncBus>, push_enabled: bool) -> Self {
        Self {
            db,
            bus,
            push_enabled,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of live subscription tasks (leak tests assert this
    /// returns to zero after observers disconnect)
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscribe to pushes for one order id ("order:xyz")
    pub async fn subscribe(&self, order_id: &str) -> OrderSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let token = self
            .bus
            .shutdown_token()
            .child_token();

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(self.active.clone());

        let live = self.open_live_stream().await;
        let bus_rx = self.bus.subscribe();
        let task_token = token.clone();
        let watched = order_id.to_string();

        tokio::spawn(async move {
            let _guard = guard;
            forward(watched, tx, bus_rx, live, task_token).await;
        });

        OrderSubscription { rx, token }
    }

    /// Open the store-level change feed, if the storage tier supports it
    async fn open_live_stream(
        &self,
    ) -> BoxStream<'static, surrealdb::Result<Notification<Order>>> {
        if !self.push_enabled {
            return futures::stream::pending().boxed();
        }
        match self.db.select::<Vec<Order>>(ORDER_TABLE).live().await {
            Ok(stream) => stream.boxed(),
            Err(e) => {
                // Best-effort: the bus leg still delivers in-process changes
                tracing::debug!("Live query unavailable, push downgraded to bus-only: {}", e);
                futures::stream::pending().boxed()
            }
        }
    }
}

/// Forward bus messages and live notifications for `watched` until the
/// observer disconnects, the order is deleted, or the bus shuts down
async fn forward(
    watched: String,
    tx: mpsc::Sender<Order>,
    mut bus_rx: broadcast::Receiver<shared::message::BusMessage>,
    mut live: BoxStream<'static, surrealdb::Result<Notification<Order>>>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,

            msg = bus_rx.recv() => {
                match msg {
                    Ok(msg) if msg.event_type == EventType::Sync => {
                        let Some(payload) = msg.as_sync() else { continue };
                        if payload.resource != "order" || payload.id != watched {
                            continue;
                        }
                        match payload.data {
                            Some(data) => {
                                let Ok(order) = serde_json::from_value::<Order>(data) else {
                                    continue;
                                };
                                if tx.send(order).await.is_err() {
                                    break;
                                }
                            }
                            // Deleted (declined): end the stream
                            None => break,
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Push subscriber for {} lagged, skipped {} messages",
                            watched,
                            skipped
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            notification = live.next() => {
                match notification {
                    Some(Ok(notif)) => {
                        if notif.data.id_string() != watched {
                            continue;
                        }
                        match notif.action {
                            Action::Delete => break,
                            _ => {
                                if tx.send(notif.data).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!("Live query error for {}: {}", watched, e);
                    }
                    // Live stream closed; the bus leg keeps the task alive
                    None => {
                        live = futures::stream::pending().boxed();
                    }
                }
            }
        }
    }
}
