//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, ListParams, UserRef};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment on `post_id` written by `author_id`
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Comments of a post, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Count comments, of one post or of all posts
    async fn count_all(&self, post_id: Option<i64>) -> Result<i64>;

    /// One page of comments, of one post or of all posts, newest first
    async fn list_all(&self, post_id: Option<i64>, params: &ListParams) -> Result<Vec<Comment>>;

    /// Replace the text of a comment
    async fn update(&self, id: i64, text: &str) -> Result<Option<Comment>>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Comment repository implementation
pub struct CommentRepositoryImpl {
    pool: DynDatabasePool,
}

impl CommentRepositoryImpl {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_COMMENT: &str = r#"
    SELECT cm.id, cm.text, cm.post_id, cm.created_at,
           cm.author_id, u.username AS author_username
    FROM comments cm
    INNER JOIN users u ON u.id = cm.author_id
"#;

#[async_trait]
impl CommentRepository for CommentRepositoryImpl {
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        const SQL: &str =
            "INSERT INTO comments (text, post_id, author_id, created_at) VALUES (?, ?, ?, ?)";
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(text)
                .bind(post_id)
                .bind(author_id)
                .bind(now)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(text)
                .bind(post_id)
                .bind(author_id)
                .bind(now)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create comment")?;

        self.get_by_id(id)
            .await?
            .with_context(|| format!("Comment {} missing right after insert", id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_comment_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_comment_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_comments_sqlite(self.pool.sqlite()?, post_id).await,
            DatabaseDriver::Mysql => list_comments_mysql(self.pool.mysql()?, post_id).await,
        }
    }

    async fn count_all(&self, post_id: Option<i64>) -> Result<i64> {
        const SQL: &str = "SELECT COUNT(*) FROM comments WHERE (? IS NULL OR post_id = ?)";
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query_scalar::<_, i64>(SQL)
                .bind(post_id)
                .bind(post_id)
                .fetch_one(self.pool.sqlite()?)
                .await,
            DatabaseDriver::Mysql => sqlx::query_scalar::<_, i64>(SQL)
                .bind(post_id)
                .bind(post_id)
                .fetch_one(self.pool.mysql()?)
                .await,
        }
        .context("Failed to count comments")?;
        Ok(count)
    }

    async fn list_all(&self, post_id: Option<i64>, params: &ListParams) -> Result<Vec<Comment>> {
        let sql = format!(
            "{SELECT_COMMENT} WHERE (? IS NULL OR cm.post_id = ?) \
             ORDER BY cm.created_at DESC, cm.id DESC LIMIT ? OFFSET ?"
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(post_id)
                    .bind(post_id)
                    .bind(params.limit())
                    .bind(params.offset())
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list comments")?;
                rows.iter().map(row_to_comment_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(post_id)
                    .bind(post_id)
                    .bind(params.limit())
                    .bind(params.offset())
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list comments")?;
                rows.iter().map(row_to_comment_mysql).collect()
            }
        }
    }

    async fn update(&self, id: i64, text: &str) -> Result<Option<Comment>> {
        const SQL: &str = "UPDATE comments SET text = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(text)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(text)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to update comment")?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        const SQL: &str = "DELETE FROM comments WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete comment")?;
        Ok(affected > 0)
    }
}

// SQLite

async fn get_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("{SELECT_COMMENT} WHERE cm.id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;
    row.map(|r| row_to_comment_sqlite(&r)).transpose()
}

async fn list_comments_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    let sql = format!("{SELECT_COMMENT} WHERE cm.post_id = ? ORDER BY cm.created_at ASC, cm.id ASC");
    let rows = sqlx::query(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;
    rows.iter().map(row_to_comment_sqlite).collect()
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        author: UserRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

// MySQL

async fn get_comment_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("{SELECT_COMMENT} WHERE cm.id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;
    row.map(|r| row_to_comment_mysql(&r)).transpose()
}

async fn list_comments_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<Comment>> {
    let sql = format!("{SELECT_COMMENT} WHERE cm.post_id = ? ORDER BY cm.created_at ASC, cm.id ASC");
    let rows = sqlx::query(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;
    rows.iter().map(row_to_comment_mysql).collect()
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        author: UserRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        created_at: row.try_get("created_at")?,
    })
}
