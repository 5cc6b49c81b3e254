//! Menu Item Repository — stock ledger
//!
//! 库存计数器：有下限 0，无上限。`stock` 与 `out_of_stock` 在同一条
//! UPDATE 里落盘，调整在存储事务内完成，避免并发丢失更新。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{MenuItem, MenuItemCreate};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const MENU_ITEM_TABLE: &str = "menu_item";

/// Retry cap for the stock compare-and-swap
const CAS_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> RepoResult<RecordId> {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid menu item ID format: {}", id)))
    }

    /// Find all active menu items
    pub async fn find_all(&self) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu_item WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find menu item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let thing = Self::parse_id(id)?;
        let item: Option<MenuItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Fetch or fail with NotFound
    pub async fn get(&self, id: &str) -> RepoResult<MenuItem> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))
    }

    /// Create a new menu item
    pub async fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let stock = data.stock.max(0);
        let item = MenuItem {
            id: None,
            name: data.name,
            price: data.price,
            stock,
            low_stock_threshold: data.low_stock_threshold.unwrap_or(0),
            out_of_stock: stock <= 0,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<MenuItem> = self
            .base
            .db()
            .create(MENU_ITEM_TABLE)
            .content(item)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    /// Apply a signed stock delta, clamped at zero
    ///
    /// Read-clamp-write as a compare-and-swap: the update is conditional on
    /// the stock still holding the value that was read, so concurrent
    /// adjustments to the same item never lose updates. `stock` and the
    /// recomputed `out_of_stock` land in one record update.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> RepoResult<MenuItem> {
        let thing = Self::parse_id(id)?;

        for _ in 0..CAS_ATTEMPTS {
            let current = self.get(id).await?;
            let next = (current.stock + delta).max(0);

            let mut result = self
                .base
                .db()
                .query(
                    "UPDATE $item SET stock = $next, out_of_stock = $out_of_stock \
                     WHERE stock = $prev RETURN AFTER",
                )
                .bind(("item", thing.clone()))
                .bind(("next", next))
                .bind(("out_of_stock", next <= 0))
                .bind(("prev", current.stock))
                .await?;
            let items: Vec<MenuItem> = result.take(0)?;
            if let Some(item) = items.into_iter().next() {
                return Ok(item);
            }
            // Lost the race; re-read and retry against the fresh value
        }

        Err(RepoError::Conflict(format!(
            "Stock adjustment for {} kept losing to concurrent writers",
            id
        )))
    }

    /// Consume stock for an ordered quantity
    ///
    /// `qty` must be positive; equivalent to `adjust_stock(id, -qty)`.
    pub async fn reduce_stock(&self, id: &str, qty: i64) -> RepoResult<MenuItem> {
        if qty <= 0 {
            return Err(RepoError::Validation(format!(
                "Invalid quantity {}: must be positive",
                qty
            )));
        }
        self.adjust_stock(id, -qty).await
    }
}
