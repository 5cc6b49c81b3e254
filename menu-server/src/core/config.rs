//! 服务器配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/menu-server | 工作目录 |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | POLL_INTERVAL_MS | 2000 | 下发给前端的轮询间隔 (钳制 1000–5000) |
//! | PUSH_ENABLED | true | 是否启用存储层 live query 推送 |
//! | SYNC_CHANNEL_CAPACITY | 1024 | 同步总线容量 |
//!
//! # 示例
//!
//! ```ignore
//! WORK_DIR=/data/menu HTTP_PORT=8080 cargo run
//! ```

use std::path::PathBuf;

/// Lower bound of the advertised poll interval (staleness cap)
pub const POLL_INTERVAL_MIN_MS: u64 = 1000;
/// Upper bound of the advertised poll interval (load cap)
pub const POLL_INTERVAL_MAX_MS: u64 = 5000;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 轮询间隔 (毫秒)，下发给所有观察者；钳制在 1000–5000
    pub poll_interval_ms: u64,
    /// 是否启用存储层推送 (live query)；关闭后推送退化为进程内总线
    pub push_enabled: bool,
    /// 同步总线广播通道容量
    pub sync_channel_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/menu-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            poll_interval_ms: clamp_poll_interval(
                std::env::var("POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(2000),
            ),
            push_enabled: std::env::var("PUSH_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            sync_channel_capacity: std::env::var("SYNC_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Clamp the advertised poll interval into the supported band
///
/// Observers must see order changes within bounded staleness; too-short
/// intervals hammer the store, too-long ones break the staleness contract.
pub fn clamp_poll_interval(ms: u64) -> u64 {
    ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}
