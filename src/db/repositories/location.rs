//! Location repository
//!
//! Database operations for locations.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Location, LocationInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Location repository trait
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &Location) -> Result<Location>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List all locations by name
    async fn list(&self) -> Result<Vec<Location>>;

    async fn update(&self, id: i64, input: &LocationInput) -> Result<Option<Location>>;
}

/// SQLx-based location repository implementation
pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_LOCATION: &str = "SELECT id, name, is_published, created_at FROM locations";

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, location: &Location) -> Result<Location> {
        const SQL: &str = "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(&location.name)
                .bind(location.is_published)
                .bind(location.created_at)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(&location.name)
                .bind(location.is_published)
                .bind(location.created_at)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create location")?;

        Ok(Location {
            id,
            ..location.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        let sql = format!("{SELECT_LOCATION} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get location by ID")?;
                row.map(|row| {
                    Ok(Location {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        is_published: row.try_get("is_published")?,
                        created_at: row.try_get("created_at")?,
                    })
                })
                .transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get location by ID")?;
                row.map(|row| {
                    Ok(Location {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        is_published: row.try_get("is_published")?,
                        created_at: row.try_get("created_at")?,
                    })
                })
                .transpose()
            }
        }
    }

    async fn list(&self) -> Result<Vec<Location>> {
        let sql = format!("{SELECT_LOCATION} ORDER BY name, id");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list locations")?;
                rows.iter()
                    .map(|row| {
                        Ok(Location {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                            is_published: row.try_get("is_published")?,
                            created_at: row.try_get("created_at")?,
                        })
                    })
                    .collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list locations")?;
                rows.iter()
                    .map(|row| {
                        Ok(Location {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                            is_published: row.try_get("is_published")?,
                            created_at: row.try_get("created_at")?,
                        })
                    })
                    .collect()
            }
        }
    }

    async fn update(&self, id: i64, input: &LocationInput) -> Result<Option<Location>> {
        const SQL: &str = "UPDATE locations SET name = ?, is_published = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(&input.name)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(&input.name)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to update location")?;

        self.get_by_id(id).await
    }
}
