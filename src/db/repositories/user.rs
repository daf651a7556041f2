//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{UpdateUserInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite the editable profile fields of a user
    async fn update_profile(&self, id: i64, input: &UpdateUserInput) -> Result<Option<User>>;

    /// Count total users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, first_name, last_name, password_hash, is_superuser, created_at
    FROM users
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, first_name, last_name, password_hash, is_superuser, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_PROFILE: &str = r#"
    UPDATE users SET username = ?, email = ?, first_name = ?, last_name = ?
    WHERE id = ?
"#;

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.sqlite()?, user).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.mysql()?, user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_user_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_username_sqlite(self.pool.sqlite()?, username).await
            }
            DatabaseDriver::Mysql => get_user_by_username_mysql(self.pool.mysql()?, username).await,
        }
    }

    async fn update_profile(&self, id: i64, input: &UpdateUserInput) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.sqlite()?;
                update_profile_sqlite(pool, id, input).await?;
                get_user_by_id_sqlite(pool, id).await
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.mysql()?;
                update_profile_mysql(pool, id, input).await?;
                get_user_by_id_mysql(pool, id).await
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        const SQL: &str = "SELECT COUNT(*) FROM users";
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar::<_, i64>(SQL)
                    .fetch_one(self.pool.sqlite()?)
                    .await
            }
            DatabaseDriver::Mysql => {
                sqlx::query_scalar::<_, i64>(SQL)
                    .fetch_one(self.pool.mysql()?)
                    .await
            }
        }
        .context("Failed to count users")?;
        Ok(count)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        ..user.clone()
    })
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE username = ?");
    let row = sqlx::query(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn update_profile_sqlite(pool: &SqlitePool, id: i64, input: &UpdateUserInput) -> Result<()> {
    sqlx::query(UPDATE_PROFILE)
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user profile")?;
    Ok(())
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        is_superuser: row.try_get("is_superuser")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        ..user.clone()
    })
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE username = ?");
    let row = sqlx::query(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn update_profile_mysql(pool: &MySqlPool, id: i64, input: &UpdateUserInput) -> Result<()> {
    sqlx::query(UPDATE_PROFILE)
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user profile")?;
    Ok(())
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        is_superuser: row.try_get("is_superuser")?,
        created_at: row.try_get("created_at")?,
    })
}
