//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> RepoResult<RecordId> {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid table ID format: {}", id)))
    }

    /// Find all active dining tables
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = Self::parse_id(id)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        // Check duplicate name
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Conflict(format!(
                "Table '{}' already exists",
                data.name
            )));
        }

        let table = DiningTable {
            id: None,
            name: data.name,
            capacity: data.capacity.unwrap_or(4),
            is_active: true,
            session_token: None,
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = Self::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))?;

        if let Some(new_name) = &data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Conflict(format!(
                "Table '{}' already exists",
                new_name
            )));
        }

        let name = data.name.unwrap_or(existing.name);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET name = $name, capacity = $capacity, is_active = $is_active RETURN AFTER")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("capacity", capacity))
            .bind(("is_active", is_active))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        tables
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Bind a fresh customer session to the table
    ///
    /// Rotates the session token; the previous session, if any, is evicted.
    pub async fn bind_session(&self, id: &str) -> RepoResult<DiningTable> {
        let thing = Self::parse_id(id)?;
        self.get_exists(id).await?;

        let token = Uuid::new_v4().to_string();
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET session_token = $token RETURN AFTER")
            .bind(("thing", thing))
            .bind(("token", token))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        tables
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = Self::parse_id(id)?;
        self.get_exists(id).await?;
        let _: Option<DiningTable> = self.base.db().delete(thing).await?;
        Ok(())
    }

    async fn get_exists(&self, id: &str) -> RepoResult<DiningTable> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }
}
