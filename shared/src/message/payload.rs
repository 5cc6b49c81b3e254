use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==================== Event Type ====================

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// 同步信号 (资源变更)
    Sync,
    /// 业务通知 (如新订单提醒)
    Notification,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Sync => write!(f, "sync"),
            EventType::Notification => write!(f, "notification"),
        }
    }
}

// ==================== Sync ====================

/// What happened to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Created => write!(f, "created"),
            SyncAction::Updated => write!(f, "updated"),
            SyncAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// 同步信号载荷 (服务端 -> 所有观察者)
///
/// 当某个资源发生变更时（下单、状态流转、支付确认、库存调整），
/// 服务端广播此信号，通知所有感兴趣的观察者刷新数据。
///
/// # 示例
/// - `resource`: "order"
/// - `version`: 42
/// - `action`: updated
/// - `id`: "order:abc123"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 (例如: "order", "menu_item", "dining_table")
    pub resource: String,
    /// 每种资源独立递增的版本号，观察者据此判断数据新旧
    pub version: u64,
    /// 变更类型
    pub action: SyncAction,
    /// 资源 ID
    pub id: String,
    /// 变更后的完整记录 (deleted 时为 None)
    pub data: Option<serde_json::Value>,
}

// ==================== Notification ====================

/// 业务通知载荷 (服务端 -> 观察者)
///
/// Presentation (sound, vibration) is up to the frontend; the server only
/// delivers the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

// ==================== Envelope ====================

/// Bus message envelope carried on the in-process sync bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            payload,
        }
    }

    /// 创建同步信号消息
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            serde_json::to_value(payload).expect("SyncPayload serializes"),
        )
    }

    /// 创建业务通知消息
    pub fn notification(payload: &NotificationPayload) -> Self {
        Self::new(
            EventType::Notification,
            serde_json::to_value(payload).expect("NotificationPayload serializes"),
        )
    }

    /// Decode the payload back into a [`SyncPayload`], if this is a sync message
    pub fn as_sync(&self) -> Option<SyncPayload> {
        if self.event_type != EventType::Sync {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}
