//! Repository Module
//!
//! Data access for SurrealDB tables. Mutations are targeted partial
//! updates (`UPDATE ... SET field = ...`), never whole-document rewrites,
//! so concurrent writers only collide on the fields they both touch.

pub mod dining_table;
pub mod guest;
pub mod menu_item;
pub mod order;

// Re-exports
pub use dining_table::DiningTableRepository;
pub use guest::GuestRepository;
pub use menu_item::MenuItemRepository;
pub use order::{OrderListFilter, OrderRepository};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "order:abc".parse()?;
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId
//
// 订单内部对其他记录的引用 (table, menu_item) 以字符串形式存储，
// 以保持行项目快照的自包含性。

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
