//! Post repository
//!
//! Database operations for posts.
//!
//! Every read joins the author, the category and (optionally) the location,
//! and annotates each row with its comment count so that listings and the
//! detail page share one row shape.
//!
//! Listings are selected by a [`PostFilter`]. The public filters apply the
//! visibility rule in SQL so pagination counts only what the reader may see:
//! the post is published, its `pub_date` is not in the future and its
//! category is published. [`PostFilter::All`] ignores visibility and is
//! meant for the moderation pages.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CategoryRef, ListParams, LocationRef, Post, PostInput, UserRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

/// Which posts a listing should contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Publicly visible posts
    Public,
    /// Publicly visible posts of one category
    Category(i64),
    /// Posts of one author; hidden ones only when `include_hidden` is set
    Author { author_id: i64, include_hidden: bool },
    /// Every post, optionally narrowed by category, author username and a
    /// case-insensitive substring of the title
    All {
        category_id: Option<i64>,
        author: Option<String>,
        title: Option<String>,
    },
}

/// A value bound into a filter's WHERE clause
#[derive(Debug, Clone)]
enum FilterArg {
    Time(DateTime<Utc>),
    Id(i64),
    Text(String),
}

/// `LIKE` pattern matching `term` anywhere, with `!` as the escape character
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const PUBLIC_CONDITION: &str = "p.is_published = 1 AND p.pub_date <= ? AND c.is_published = 1";

impl PostFilter {
    /// WHERE clause (without the keyword) and its bind values, in order
    fn where_clause(&self, now: DateTime<Utc>) -> (String, Vec<FilterArg>) {
        match *self {
            PostFilter::All {
                category_id,
                ref author,
                ref title,
            } => {
                let mut conditions = vec!["1 = 1".to_string()];
                let mut args = Vec::new();
                if let Some(category_id) = category_id {
                    conditions.push("p.category_id = ?".into());
                    args.push(FilterArg::Id(category_id));
                }
                if let Some(author) = author {
                    conditions.push("u.username = ?".into());
                    args.push(FilterArg::Text(author.clone()));
                }
                if let Some(title) = title {
                    conditions.push("LOWER(p.title) LIKE LOWER(?) ESCAPE '!'".into());
                    args.push(FilterArg::Text(contains_pattern(title)));
                }
                (conditions.join(" AND "), args)
            }
            PostFilter::Public => (PUBLIC_CONDITION.to_string(), vec![FilterArg::Time(now)]),
            PostFilter::Category(category_id) => (
                format!("{PUBLIC_CONDITION} AND p.category_id = ?"),
                vec![FilterArg::Time(now), FilterArg::Id(category_id)],
            ),
            PostFilter::Author {
                author_id,
                include_hidden: true,
            } => ("p.author_id = ?".to_string(), vec![FilterArg::Id(author_id)]),
            PostFilter::Author {
                author_id,
                include_hidden: false,
            } => (
                format!("{PUBLIC_CONDITION} AND p.author_id = ?"),
                vec![FilterArg::Time(now), FilterArg::Id(author_id)],
            ),
        }
    }
}

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post written by `author_id`
    async fn create(&self, author_id: i64, input: &PostInput) -> Result<Post>;

    /// Get a post by ID regardless of its visibility
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Count posts matching `filter` at `now`
    async fn count(&self, filter: &PostFilter, now: DateTime<Utc>) -> Result<i64>;

    /// One page of posts matching `filter`, newest `pub_date` first
    async fn list(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        params: &ListParams,
    ) -> Result<Vec<Post>>;

    /// Overwrite the editable fields of a post; the author never changes
    async fn update(&self, id: i64, input: &PostInput) -> Result<Option<Post>>;

    /// Set the publication flag and category, the fields moderated inline
    async fn moderate(&self, id: i64, is_published: bool, category_id: i64) -> Result<Option<Post>>;

    /// Delete a post (comments go with it)
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_POST: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at,
           p.author_id, u.username AS author_username,
           p.category_id, c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           p.location_id, l.name AS location_name, l.is_published AS location_is_published,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    INNER JOIN users u ON u.id = p.author_id
    INNER JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const COUNT_POSTS: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    INNER JOIN users u ON u.id = p.author_id
    INNER JOIN categories c ON c.id = p.category_id
"#;

const INSERT_POST: &str = r#"
    INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id, is_published, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_POST: &str = r#"
    UPDATE posts
    SET title = ?, text = ?, pub_date = ?, category_id = ?, location_id = ?, is_published = ?
    WHERE id = ?
"#;

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, author_id: i64, input: &PostInput) -> Result<Post> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_POST)
                .bind(&input.title)
                .bind(&input.text)
                .bind(input.pub_date)
                .bind(author_id)
                .bind(input.category_id)
                .bind(input.location_id)
                .bind(input.is_published)
                .bind(now)
                .execute(self.pool.sqlite()?)
                .await
                .map(|r| r.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_POST)
                .bind(&input.title)
                .bind(&input.text)
                .bind(input.pub_date)
                .bind(author_id)
                .bind(input.category_id)
                .bind(input.location_id)
                .bind(input.is_published)
                .bind(now)
                .execute(self.pool.mysql()?)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create post")?;

        self.get_by_id(id)
            .await?
            .with_context(|| format!("Post {} missing right after insert", id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("{SELECT_POST} WHERE p.id = ?");
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get post by ID")?;
                row.map(|r| row_to_post_sqlite(&r)).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get post by ID")?;
                row.map(|r| row_to_post_mysql(&r)).transpose()
            }
        }
    }

    async fn count(&self, filter: &PostFilter, now: DateTime<Utc>) -> Result<i64> {
        let (condition, args) = filter.where_clause(now);
        let sql = format!("{COUNT_POSTS} WHERE {condition}");
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query_scalar::<_, i64>(&sql);
                for arg in args {
                    query = match arg {
                        FilterArg::Time(t) => query.bind(t),
                        FilterArg::Id(id) => query.bind(id),
                        FilterArg::Text(text) => query.bind(text),
                    };
                }
                query.fetch_one(self.pool.sqlite()?).await
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query_scalar::<_, i64>(&sql);
                for arg in args {
                    query = match arg {
                        FilterArg::Time(t) => query.bind(t),
                        FilterArg::Id(id) => query.bind(id),
                        FilterArg::Text(text) => query.bind(text),
                    };
                }
                query.fetch_one(self.pool.mysql()?).await
            }
        }
        .context("Failed to count posts")?;
        Ok(count)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
        params: &ListParams,
    ) -> Result<Vec<Post>> {
        let (condition, args) = filter.where_clause(now);
        let sql = format!(
            "{SELECT_POST} WHERE {condition} ORDER BY p.pub_date DESC, p.id DESC LIMIT ? OFFSET ?"
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                for arg in args {
                    query = match arg {
                        FilterArg::Time(t) => query.bind(t),
                        FilterArg::Id(id) => query.bind(id),
                        FilterArg::Text(text) => query.bind(text),
                    };
                }
                let rows = query
                    .bind(params.limit())
                    .bind(params.offset())
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list posts")?;
                rows.iter().map(row_to_post_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                for arg in args {
                    query = match arg {
                        FilterArg::Time(t) => query.bind(t),
                        FilterArg::Id(id) => query.bind(id),
                        FilterArg::Text(text) => query.bind(text),
                    };
                }
                let rows = query
                    .bind(params.limit())
                    .bind(params.offset())
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list posts")?;
                rows.iter().map(row_to_post_mysql).collect()
            }
        }
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(UPDATE_POST)
                .bind(&input.title)
                .bind(&input.text)
                .bind(input.pub_date)
                .bind(input.category_id)
                .bind(input.location_id)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(UPDATE_POST)
                .bind(&input.title)
                .bind(&input.text)
                .bind(input.pub_date)
                .bind(input.category_id)
                .bind(input.location_id)
                .bind(input.is_published)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to update post")?;

        self.get_by_id(id).await
    }

    async fn moderate(&self, id: i64, is_published: bool, category_id: i64) -> Result<Option<Post>> {
        const SQL: &str = "UPDATE posts SET is_published = ?, category_id = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(is_published)
                .bind(category_id)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(is_published)
                .bind(category_id)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .map(|_| ()),
        }
        .context("Failed to moderate post")?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        const SQL: &str = "DELETE FROM posts WHERE id = ?";
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
        .context("Failed to delete post")
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let location_id: Option<i64> = row.try_get("location_id")?;
    let location = match location_id {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get::<Option<String>, _>("location_name")?.unwrap_or_default(),
            is_published: row
                .try_get::<Option<bool>, _>("location_is_published")?
                .unwrap_or(false),
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        author: UserRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category: CategoryRef {
            id: row.try_get("category_id")?,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        },
        location,
        comment_count: row.try_get("comment_count")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let location_id: Option<i64> = row.try_get("location_id")?;
    let location = match location_id {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get::<Option<String>, _>("location_name")?.unwrap_or_default(),
            is_published: row
                .try_get::<Option<bool>, _>("location_is_published")?
                .unwrap_or(false),
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        author: UserRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category: CategoryRef {
            id: row.try_get("category_id")?,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        },
        location,
        comment_count: row.try_get("comment_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, LocationRepository, SqlxCategoryRepository, SqlxLocationRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Category, Location, User};
    use chrono::Duration;

    struct Fixture {
        pool: DynDatabasePool,
        repo: SqlxPostRepository,
        alice: i64,
        bob: i64,
        travel: i64,
        hidden: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let alice = users
            .create(&User::new("alice".into(), "a@example.com".into(), "h".into(), false))
            .await
            .unwrap()
            .id;
        let bob = users
            .create(&User::new("bob".into(), "b@example.com".into(), "h".into(), false))
            .await
            .unwrap()
            .id;

        let categories = SqlxCategoryRepository::new(pool.clone());
        let travel = categories
            .create(&Category::new("Travel".into(), String::new(), "travel".into(), true))
            .await
            .unwrap()
            .id;
        let hidden = categories
            .create(&Category::new("Hidden".into(), String::new(), "hidden".into(), false))
            .await
            .unwrap()
            .id;

        Fixture {
            repo: SqlxPostRepository::new(pool.clone()),
            pool,
            alice,
            bob,
            travel,
            hidden,
        }
    }

    fn input(title: &str, category_id: i64, pub_date: DateTime<Utc>, is_published: bool) -> PostInput {
        PostInput {
            title: title.to_string(),
            text: format!("{title} body"),
            pub_date,
            category_id,
            location_id: None,
            is_published,
        }
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let f = setup().await;
        let past = Utc::now() - Duration::hours(1);

        let post = f
            .repo
            .create(f.alice, &input("Hello", f.travel, past, true))
            .await
            .expect("Failed to create post");

        assert!(post.id > 0);
        assert_eq!(post.author.username, "alice");
        assert_eq!(post.category.slug, "travel");
        assert!(post.location.is_none());
        assert_eq!(post.comment_count, 0);

        let found = f.repo.get_by_id(post.id).await.unwrap().expect("Post not found");
        assert_eq!(found.title, "Hello");
        assert!(f.repo.get_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_with_location() {
        let f = setup().await;
        let locations = SqlxLocationRepository::new(f.pool.clone());
        let oslo = locations.create(&Location::new("Oslo".into(), true)).await.unwrap();

        let mut data = input("Trip", f.travel, Utc::now(), true);
        data.location_id = Some(oslo.id);
        let post = f.repo.create(f.alice, &data).await.unwrap();

        let location = post.location.expect("Location should be loaded");
        assert_eq!(location.name, "Oslo");
        assert!(location.is_published);
    }

    #[tokio::test]
    async fn test_public_filter_applies_every_rule() {
        let f = setup().await;
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::days(1);

        f.repo.create(f.alice, &input("visible", f.travel, past, true)).await.unwrap();
        f.repo.create(f.alice, &input("draft", f.travel, past, false)).await.unwrap();
        f.repo.create(f.alice, &input("scheduled", f.travel, future, true)).await.unwrap();
        f.repo.create(f.alice, &input("hidden-cat", f.hidden, past, true)).await.unwrap();

        let params = ListParams::default();
        let public = f.repo.list(&PostFilter::Public, now, &params).await.unwrap();
        assert_eq!(titles(&public), vec!["visible"]);
        assert_eq!(f.repo.count(&PostFilter::Public, now).await.unwrap(), 1);

        let own = PostFilter::Author {
            author_id: f.alice,
            include_hidden: true,
        };
        assert_eq!(f.repo.count(&own, now).await.unwrap(), 4);

        let others_view = PostFilter::Author {
            author_id: f.alice,
            include_hidden: false,
        };
        assert_eq!(f.repo.count(&others_view, now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let f = setup().await;
        let now = Utc::now();
        let past = now - Duration::hours(1);

        f.repo.create(f.alice, &input("travel", f.travel, past, true)).await.unwrap();
        f.repo.create(f.bob, &input("hidden", f.hidden, past, true)).await.unwrap();

        let params = ListParams::default();
        let listed = f.repo.list(&PostFilter::Category(f.travel), now, &params).await.unwrap();
        assert_eq!(titles(&listed), vec!["travel"]);
        assert_eq!(f.repo.count(&PostFilter::Category(f.hidden), now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let f = setup().await;
        let now = Utc::now();

        for i in 0..12 {
            let date = now - Duration::hours(24 - i);
            f.repo
                .create(f.alice, &input(&format!("post-{i:02}"), f.travel, date, true))
                .await
                .unwrap();
        }

        let first = f.repo.list(&PostFilter::Public, now, &ListParams::new(1, 10)).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].title, "post-11");
        assert_eq!(first[9].title, "post-02");

        let second = f.repo.list(&PostFilter::Public, now, &ListParams::new(2, 10)).await.unwrap();
        assert_eq!(titles(&second), vec!["post-01", "post-00"]);
    }

    #[tokio::test]
    async fn test_all_filter_ignores_visibility() {
        let f = setup().await;
        let now = Utc::now();
        let past = now - Duration::hours(1);

        f.repo.create(f.alice, &input("Alpine draft", f.travel, past, false)).await.unwrap();
        f.repo.create(f.alice, &input("100% river", f.hidden, past, true)).await.unwrap();
        f.repo.create(f.bob, &input("alpine lakes", f.travel, past, true)).await.unwrap();

        let params = ListParams::default();
        let everything = PostFilter::All {
            category_id: None,
            author: None,
            title: None,
        };
        assert_eq!(f.repo.count(&everything, now).await.unwrap(), 3);

        let alpine = PostFilter::All {
            category_id: None,
            author: None,
            title: Some("ALPINE".into()),
        };
        assert_eq!(f.repo.count(&alpine, now).await.unwrap(), 2);

        let alices_alpine = PostFilter::All {
            category_id: Some(f.travel),
            author: Some("alice".into()),
            title: Some("alpine".into()),
        };
        let listed = f.repo.list(&alices_alpine, now, &params).await.unwrap();
        assert_eq!(titles(&listed), vec!["Alpine draft"]);

        // Wildcards in the search term match literally
        let percent = PostFilter::All {
            category_id: None,
            author: None,
            title: Some("%".into()),
        };
        let listed = f.repo.list(&percent, now, &params).await.unwrap();
        assert_eq!(titles(&listed), vec!["100% river"]);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("abc"), "%abc%");
        assert_eq!(contains_pattern("5%_!"), "%5!%!_!!%");
    }

    #[tokio::test]
    async fn test_moderate_changes_only_flag_and_category() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.alice, &input("draft", f.travel, Utc::now(), false))
            .await
            .unwrap();

        let moderated = f
            .repo
            .moderate(post.id, true, f.hidden)
            .await
            .unwrap()
            .expect("Post not found");
        assert!(moderated.is_published);
        assert_eq!(moderated.category.id, f.hidden);
        assert_eq!(moderated.title, "draft");
        assert_eq!(moderated.author.id, f.alice);

        assert!(f.repo.moderate(9999, true, f.travel).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_author() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.alice, &input("before", f.travel, Utc::now(), true))
            .await
            .unwrap();

        let updated = f
            .repo
            .update(post.id, &input("after", f.hidden, Utc::now(), false))
            .await
            .unwrap()
            .expect("Post not found");

        assert_eq!(updated.title, "after");
        assert_eq!(updated.category.id, f.hidden);
        assert!(!updated.is_published);
        assert_eq!(updated.author.id, f.alice);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let f = setup().await;
        let post = f
            .repo
            .create(f.alice, &input("bye", f.travel, Utc::now(), true))
            .await
            .unwrap();

        f.repo.delete(post.id).await.unwrap();
        assert!(f.repo.get_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_location_keeps_post() {
        let f = setup().await;
        let locations = SqlxLocationRepository::new(f.pool.clone());
        let oslo = locations.create(&Location::new("Oslo".into(), true)).await.unwrap();

        let mut data = input("Trip", f.travel, Utc::now(), true);
        data.location_id = Some(oslo.id);
        let post = f.repo.create(f.alice, &data).await.unwrap();

        f.pool
            .execute(&format!("DELETE FROM locations WHERE id = {}", oslo.id))
            .await
            .unwrap();

        let reloaded = f.repo.get_by_id(post.id).await.unwrap().expect("Post not found");
        assert!(reloaded.location.is_none());
    }
}
