//! Server state
//!
//! [`ServerState`] 持有所有服务的共享引用，使用 Arc 实现浅拷贝。

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{BusMessage, NotificationPayload, SyncAction, SyncPayload};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::sync::{OrderWatcher, SyncBus};

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// broadcast_sync 时自动生成递增的版本号，观察者据此判断数据新旧。
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | bus | Arc<SyncBus> | 同步总线 |
/// | watcher | OrderWatcher | 订单推送订阅管理 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 同步总线
    pub bus: Arc<SyncBus>,
    /// 订单推送订阅管理
    pub watcher: OrderWatcher,
    /// 资源版本管理器 (用于 broadcast_sync 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database)
    /// 3. 同步总线与推送订阅管理
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_service = DbService::new(&config.database_dir())
            .await
            .expect("Failed to initialize database");

        Self::with_db(config, db_service.db)
    }

    /// 初始化内存数据库状态 (测试、临时运行)
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db_service = DbService::new_memory()
            .await
            .expect("Failed to initialize in-memory database");
        Self::with_db(config, db_service.db)
    }

    fn with_db(config: &Config, db: Surreal<Db>) -> Self {
        let bus = Arc::new(SyncBus::with_capacity(config.sync_channel_capacity));
        let watcher = OrderWatcher::new(db.clone(), bus.clone(), config.push_enabled);
        Self {
            config: config.clone(),
            db,
            bus,
            watcher,
            resource_versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 广播同步消息
    ///
    /// 向所有观察者广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "order", "menu_item", "dining_table")
    /// - `action`: 变更类型
    /// - `id`: 资源 ID
    /// - `data`: 变更后的完整记录 (deleted 时为 None)
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: SyncAction,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action,
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        self.bus.publish(BusMessage::sync(&payload));
    }

    /// 广播业务通知 (如后厨的新订单提醒)
    pub fn notify(&self, title: &str, message: &str, data: Option<serde_json::Value>) {
        let payload = NotificationPayload {
            title: title.to_string(),
            message: message.to_string(),
            data,
        };
        self.bus.publish(BusMessage::notification(&payload));
    }

    /// 优雅关闭：结束所有推送订阅任务
    pub fn shutdown(&self) {
        self.bus.shutdown();
    }
}
