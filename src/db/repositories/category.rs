//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories, published or not, by title
    async fn list(&self) -> Result<Vec<Category>>;

    /// Update a category in place
    async fn update(&self, id: i64, input: &CategoryInput) -> Result<Option<Category>>;

    /// Check if a slug is taken by a category other than `exclude_id`
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_CATEGORY: &str = r#"
    SELECT id, title, description, slug, is_published, created_at
    FROM categories
"#;

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (title, description, slug, is_published, created_at)
    VALUES (?, ?, ?, ?, ?)
"#;

const UPDATE_CATEGORY: &str = r#"
    UPDATE categories SET title = ?, description = ?, slug = ?, is_published = ?
    WHERE id = ?
"#;

const SLUG_TAKEN: &str = "SELECT COUNT(*) FROM categories WHERE slug = ? AND id <> ?";

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_CATEGORY)
                .bind(&category.title)
                .bind(&category.description)
                .bind(&category.slug)
                .bind(category.is_published)
                .bind(category.created_at)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_CATEGORY)
                .bind(&category.title)
                .bind(&category.description)
                .bind(&category.slug)
                .bind(category.is_published)
                .bind(category.created_at)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create category")?;

        Ok(Category {
            id,
            ..category.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("{SELECT_CATEGORY} WHERE id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get category by ID")?;
                row.map(|r| row_to_category_sqlite(&r)).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get category by ID")?;
                row.map(|r| row_to_category_mysql(&r)).transpose()
            }
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_slug_sqlite(self.pool.sqlite()?, slug).await,
            DatabaseDriver::Mysql => get_category_by_slug_mysql(self.pool.mysql()?, slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let sql = format!("{SELECT_CATEGORY} ORDER BY title, id");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list categories")?;
                rows.iter().map(row_to_category_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list categories")?;
                rows.iter().map(row_to_category_mysql).collect()
            }
        }
    }

    async fn update(&self, id: i64, input: &CategoryInput) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(UPDATE_CATEGORY)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.slug)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(UPDATE_CATEGORY)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.slug)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to update category")?;

        self.get_by_id(id).await
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let exclude = exclude_id.unwrap_or(0);
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar::<_, i64>(SLUG_TAKEN)
                    .bind(slug)
                    .bind(exclude)
                    .fetch_one(self.pool.sqlite()?)
                    .await
            }
            DatabaseDriver::Mysql => {
                sqlx::query_scalar::<_, i64>(SLUG_TAKEN)
                    .bind(slug)
                    .bind(exclude)
                    .fetch_one(self.pool.mysql()?)
                    .await
            }
        }
        .context("Failed to check category slug")?;
        Ok(count > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let sql = format!("{SELECT_CATEGORY} WHERE slug = ?");
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    row.map(|r| row_to_category_sqlite(&r)).transpose()
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let sql = format!("{SELECT_CATEGORY} WHERE slug = ?");
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    row.map(|r| row_to_category_mysql(&r)).transpose()
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}
