//! Comment service
//!
//! Comments are always addressed through their post: a comment reached via
//! the wrong post ID does not exist as far as callers are concerned.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{resolve_page, Comment, ListParams, PagedResult, User, PAGINATION};
use crate::services::access::{can_modify, can_view_post};

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Post or comment does not exist, or the post is hidden from the user
    #[error("Not found")]
    NotFound,

    /// The user may not change this comment
    #[error("User may not modify comments of post {post_id}")]
    NotOwner { post_id: i64 },

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// Comments of a post, oldest first
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        let comments = self
            .repo
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?;
        Ok(comments)
    }

    /// Every comment, or those of one post, newest first, for moderation
    pub async fn list_all(
        &self,
        post_id: Option<i64>,
        page: Option<&str>,
    ) -> Result<PagedResult<Comment>, CommentServiceError> {
        let total = self
            .repo
            .count_all(post_id)
            .await
            .context("Failed to count comments")?;
        let page = resolve_page(page, total, PAGINATION).ok_or(CommentServiceError::NotFound)?;
        let params = ListParams::new(page, PAGINATION);
        let comments = self
            .repo
            .list_all(post_id, &params)
            .await
            .context("Failed to list comments")?;
        Ok(PagedResult::new(comments, total, &params))
    }

    /// Add a comment to `post_id`, which must be visible to `author`
    pub async fn create(
        &self,
        post_id: i64,
        author: &User,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(CommentServiceError::NotFound)?;
        if !can_view_post(Some(author), &post, Utc::now()) {
            return Err(CommentServiceError::NotFound);
        }

        let comment = self
            .repo
            .create(post.id, author.id, text)
            .await
            .context("Failed to create comment")?;
        tracing::info!("User {} commented on post {}", author.username, post.id);
        Ok(comment)
    }

    /// A comment of `post_id` that `user` may change
    pub async fn get_for_edit(
        &self,
        post_id: i64,
        comment_id: i64,
        user: &User,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .filter(|c| c.post_id == post_id)
            .ok_or(CommentServiceError::NotFound)?;

        if !can_modify(user, comment.author.id) {
            tracing::warn!("User {} may not modify comment {}", user.username, comment_id);
            return Err(CommentServiceError::NotOwner { post_id });
        }
        Ok(comment)
    }

    pub async fn update(
        &self,
        post_id: i64,
        comment_id: i64,
        user: &User,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        self.get_for_edit(post_id, comment_id, user).await?;
        let comment = self
            .repo
            .update(comment_id, text)
            .await
            .context("Failed to update comment")?
            .ok_or(CommentServiceError::NotFound)?;
        tracing::info!("User {} edited comment {}", user.username, comment_id);
        Ok(comment)
    }

    pub async fn delete(
        &self,
        post_id: i64,
        comment_id: i64,
        user: &User,
    ) -> Result<(), CommentServiceError> {
        self.get_for_edit(post_id, comment_id, user).await?;
        self.repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;
        tracing::info!("User {} deleted comment {}", user.username, comment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, CommentRepositoryImpl, SqlxCategoryRepository, SqlxPostRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Category, PostInput};
    use chrono::Duration;

    struct Fixture {
        service: CommentService,
        posts: Arc<dyn PostRepository>,
        alice: User,
        bob: User,
        admin: User,
        public_post: i64,
        draft_post: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let admin = users
            .create(&User::new("admin".into(), "root@example.com".into(), "h".into(), true))
            .await
            .unwrap();
        let alice = users
            .create(&User::new("alice".into(), "a@example.com".into(), "h".into(), false))
            .await
            .unwrap();
        let bob = users
            .create(&User::new("bob".into(), "b@example.com".into(), "h".into(), false))
            .await
            .unwrap();

        let category = SqlxCategoryRepository::new(pool.clone())
            .create(&Category::new("Travel".into(), String::new(), "travel".into(), true))
            .await
            .unwrap();

        let posts = SqlxPostRepository::boxed(pool.clone());
        let make = |is_published: bool| PostInput {
            title: "post".into(),
            text: "body".into(),
            pub_date: Utc::now() - Duration::hours(1),
            category_id: category.id,
            location_id: None,
            is_published,
        };
        let public_post = posts.create(alice.id, &make(true)).await.unwrap().id;
        let draft_post = posts.create(alice.id, &make(false)).await.unwrap().id;

        Fixture {
            service: CommentService::new(CommentRepositoryImpl::boxed(pool), posts.clone()),
            posts,
            alice,
            bob,
            admin,
            public_post,
            draft_post,
        }
    }

    #[tokio::test]
    async fn test_comment_sets_post_and_author() {
        let f = setup().await;
        let comment = f.service.create(f.public_post, &f.bob, "hi").await.unwrap();

        assert_eq!(comment.post_id, f.public_post);
        assert_eq!(comment.author.id, f.bob.id);

        let post = f.posts.get_by_id(f.public_post).await.unwrap().unwrap();
        assert_eq!(post.comment_count, 1);
    }

    #[tokio::test]
    async fn test_cannot_comment_hidden_or_missing_post() {
        let f = setup().await;
        assert!(matches!(
            f.service.create(f.draft_post, &f.bob, "hi").await,
            Err(CommentServiceError::NotFound)
        ));
        assert!(matches!(
            f.service.create(9999, &f.bob, "hi").await,
            Err(CommentServiceError::NotFound)
        ));
        // The author may comment on their own draft
        assert!(f.service.create(f.draft_post, &f.alice, "note").await.is_ok());
    }

    #[tokio::test]
    async fn test_comment_through_wrong_post_is_not_found() {
        let f = setup().await;
        let comment = f.service.create(f.public_post, &f.bob, "hi").await.unwrap();

        assert!(matches!(
            f.service.get_for_edit(f.draft_post, comment.id, &f.bob).await,
            Err(CommentServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_all_for_moderation() {
        let f = setup().await;
        f.service.create(f.public_post, &f.bob, "public").await.unwrap();
        f.service.create(f.draft_post, &f.alice, "on draft").await.unwrap();

        let all = f.service.list_all(None, None).await.unwrap();
        assert_eq!(all.total, 2);

        let draft = f.service.list_all(Some(f.draft_post), None).await.unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].text, "on draft");

        assert!(matches!(
            f.service.list_all(None, Some("2")).await,
            Err(CommentServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_comment_ownership() {
        let f = setup().await;
        let comment = f.service.create(f.public_post, &f.bob, "hi").await.unwrap();

        assert!(matches!(
            f.service.update(f.public_post, comment.id, &f.alice, "edited").await,
            Err(CommentServiceError::NotOwner { .. })
        ));

        let edited = f
            .service
            .update(f.public_post, comment.id, &f.bob, "edited")
            .await
            .unwrap();
        assert_eq!(edited.text, "edited");

        f.service
            .delete(f.public_post, comment.id, &f.admin)
            .await
            .unwrap();
        assert!(f.service.list_for_post(f.public_post).await.unwrap().is_empty());
    }
}
