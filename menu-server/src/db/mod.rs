//! Database Module
//!
//! Embedded SurrealDB: RocksDB-backed in production, in-memory for tests.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "menu";
const DATABASE: &str = "menu";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the RocksDB-backed store under `db_dir`
    pub async fn new(db_dir: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_dir)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(db).await
    }

    /// Open an in-memory store (tests, ephemeral runs)
    pub async fn new_memory() -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (ns={}, db={})", NAMESPACE, DATABASE);
        Ok(Self { db })
    }
}

/// Define indexes for the hot query paths
///
/// Tables stay schemaless; records carry their shape through the model
/// structs. DEFINE statements are idempotent with IF NOT EXISTS.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS order_created_at ON order FIELDS created_at;
        DEFINE INDEX IF NOT EXISTS order_status ON order FIELDS status;
        DEFINE INDEX IF NOT EXISTS order_table ON order FIELDS table_id;
        DEFINE INDEX IF NOT EXISTS guest_phone ON guest FIELDS phone UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
