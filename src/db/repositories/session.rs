//! Session repository
//!
//! Database operations for login sessions.
//!
//! This module provides:
//! - `SessionRepository` trait defining the interface for session data access
//! - `SqlxSessionRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete expired sessions, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (id, user_id, expires_at, created_at)
    VALUES (?, ?, ?, ?)
"#;

const SELECT_SESSION: &str = r#"
    SELECT id, user_id, expires_at, created_at
    FROM sessions
    WHERE id = ?
"#;

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_SESSION)
                .bind(&session.id)
                .bind(session.user_id)
                .bind(session.expires_at)
                .bind(session.created_at)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_SESSION)
                .bind(&session.id)
                .bind(session.user_id)
                .bind(session.expires_at)
                .bind(session.created_at)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to create session")?;

        Ok(session.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_session_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_session_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        const SQL: &str = "DELETE FROM sessions WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to delete session")
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        const SQL: &str = "DELETE FROM sessions WHERE user_id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(user_id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(user_id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to delete sessions by user")
    }

    async fn delete_expired(&self) -> Result<u64> {
        const SQL: &str = "DELETE FROM sessions WHERE expires_at < ?";
        let now = Utc::now();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(now)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(now)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete expired sessions")
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(SELECT_SESSION)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    row.map(|row| {
        Ok(Session {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    })
    .transpose()
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_session_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(SELECT_SESSION)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    row.map(|row| {
        Ok(Session {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;
    use chrono::Duration;
    use uuid::Uuid;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    // Sessions reference users, so every test needs real user rows
    async fn create_test_user(pool: &DynDatabasePool, name: &str) -> i64 {
        SqlxUserRepository::new(pool.clone())
            .create(&User::new(name.into(), format!("{name}@example.com"), "hash".into(), false))
            .await
            .expect("Failed to create test user")
            .id
    }

    fn create_test_session(user_id: i64, expires_in_days: i64) -> Session {
        Session::new(
            Uuid::new_v4().to_string(),
            user_id,
            Duration::days(expires_in_days),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (pool, repo) = setup_test_repo().await;
        let user_id = create_test_user(&pool, "alice").await;

        let session = create_test_session(user_id, 7);
        repo.create(&session).await.expect("Failed to create session");

        let found = repo
            .get_by_id(&session.id)
            .await
            .expect("Failed to get session")
            .expect("Session not found");
        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, user_id);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_get_session_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;
        let found = repo.get_by_id("nonexistent").await.expect("Failed to get session");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (pool, repo) = setup_test_repo().await;
        let user_id = create_test_user(&pool, "alice").await;
        let session = create_test_session(user_id, 7);
        repo.create(&session).await.unwrap();

        repo.delete(&session.id).await.expect("Failed to delete session");
        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_sessions_by_user() {
        let (pool, repo) = setup_test_repo().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;

        let a1 = create_test_session(alice, 7);
        let a2 = create_test_session(alice, 7);
        let b1 = create_test_session(bob, 7);
        for s in [&a1, &a2, &b1] {
            repo.create(s).await.unwrap();
        }

        repo.delete_by_user(alice).await.unwrap();

        assert!(repo.get_by_id(&a1.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&a2.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&b1.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let (pool, repo) = setup_test_repo().await;
        let user_id = create_test_user(&pool, "alice").await;

        let live = create_test_session(user_id, 7);
        let expired = create_test_session(user_id, -1);
        repo.create(&live).await.unwrap();
        repo.create(&expired).await.unwrap();

        let removed = repo.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_by_id(&live.id).await.unwrap().is_some());
        assert!(repo.get_by_id(&expired.id).await.unwrap().is_none());
    }
}
