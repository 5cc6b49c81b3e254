//! Menu Server - 扫码点餐系统服务端
//!
//! # 架构概述
//!
//! 顾客扫桌台二维码下单，后厨/管理端流转订单状态并核销支付；
//! 所有观察者通过轮询 + 尽力推送与订单存储保持一致。
//!
//! - **订单核心** (`orders`): 状态机、支付对账、下单编排
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储与仓储层
//! - **变更传播** (`sync`): 同步总线 + 按订单的推送订阅
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! menu-server/src/
//! ├── core/          # 配置、状态、服务器启动
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── orders/        # 订单状态机与支付对账
//! ├── sync/          # 变更传播 (总线 + 推送)
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}

pub fn print_banner() {
    println!(
        r#"
   __  ___                  _____
  /  |/  /__  ____  __  __ / ___/___  ______   _____  _____
 / /|_/ / _ \/ __ \/ / / / \__ \/ _ \/ ___/ | / / _ \/ ___/
/ /  / /  __/ / / / /_/ / ___/ /  __/ /   | |/ /  __/ /
/_/  /_/\___/_/ /_/\__,_/ /____/\___/_/    |___/\___/_/
    "#
    );
}
