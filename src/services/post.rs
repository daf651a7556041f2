//! Post service
//!
//! Listing, reading and writing posts. Read paths apply the visibility rule,
//! write paths the ownership rule (see `services::access`).

use crate::db::repositories::{
    CategoryRepository, LocationRepository, PostFilter, PostRepository,
};
use crate::forms::FieldErrors;
use crate::models::{
    resolve_page, Category, ListParams, Location, PagedResult, Post, PostInput, User, PAGINATION,
};
use crate::services::access::{can_modify, can_view_post};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post, category, profile or page does not exist (or is hidden)
    #[error("Not found")]
    NotFound,

    /// The user may not change this post
    #[error("User may not modify post {post_id}")]
    NotOwner { post_id: i64 },

    /// Form input rejected
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    location_repo: Arc<dyn LocationRepository>,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        location_repo: Arc<dyn LocationRepository>,
    ) -> Self {
        Self {
            post_repo,
            category_repo,
            location_repo,
        }
    }

    /// Public posts, newest first
    pub async fn list_public(&self, page: Option<&str>) -> Result<PagedResult<Post>, PostServiceError> {
        self.paginate(PostFilter::Public, page).await
    }

    /// A published category and its public posts.
    ///
    /// Unknown and unpublished categories are `NotFound`.
    pub async fn list_by_category(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Category, PagedResult<Post>), PostServiceError> {
        let category = self
            .category_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category")?
            .filter(|c| c.is_published)
            .ok_or(PostServiceError::NotFound)?;

        let posts = self.paginate(PostFilter::Category(category.id), page).await?;
        Ok((category, posts))
    }

    /// Posts on a profile page: all of them for the owner, public ones otherwise
    pub async fn list_by_author(
        &self,
        author: &User,
        viewer: Option<&User>,
        page: Option<&str>,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let include_hidden = viewer.map(|v| v.id == author.id).unwrap_or(false);
        let filter = PostFilter::Author {
            author_id: author.id,
            include_hidden,
        };
        self.paginate(filter, page).await
    }

    /// A post `viewer` is allowed to read; hidden posts are `NotFound`
    pub async fn get_visible(&self, id: i64, viewer: Option<&User>) -> Result<Post, PostServiceError> {
        let post = self.get_any(id).await?;
        if !can_view_post(viewer, &post, Utc::now()) {
            return Err(PostServiceError::NotFound);
        }
        Ok(post)
    }

    /// A post `user` is allowed to change
    pub async fn get_for_edit(&self, id: i64, user: &User) -> Result<Post, PostServiceError> {
        let post = self.get_any(id).await?;
        if !can_modify(user, post.author.id) {
            tracing::warn!("User {} may not modify post {}", user.username, id);
            return Err(PostServiceError::NotOwner { post_id: id });
        }
        Ok(post)
    }

    /// Create a post. The author is always `author`.
    pub async fn create(&self, author: &User, input: PostInput) -> Result<Post, PostServiceError> {
        self.check_references(&input).await?;
        let post = self
            .post_repo
            .create(author.id, &input)
            .await
            .context("Failed to create post")?;
        tracing::info!("User {} created post {}", author.username, post.id);
        Ok(post)
    }

    /// Update a post after checking ownership
    pub async fn update(&self, id: i64, user: &User, input: PostInput) -> Result<Post, PostServiceError> {
        self.get_for_edit(id, user).await?;
        self.check_references(&input).await?;
        let post = self
            .post_repo
            .update(id, &input)
            .await
            .context("Failed to update post")?
            .ok_or(PostServiceError::NotFound)?;
        tracing::info!("User {} updated post {}", user.username, id);
        Ok(post)
    }

    /// Delete a post after checking ownership; returns the deleted post
    pub async fn delete(&self, id: i64, user: &User) -> Result<Post, PostServiceError> {
        let post = self.get_for_edit(id, user).await?;
        self.post_repo
            .delete(id)
            .await
            .context("Failed to delete post")?;
        tracing::info!("User {} deleted post {}", user.username, id);
        Ok(post)
    }

    /// Every post regardless of visibility, for moderation.
    ///
    /// Blank search terms are ignored.
    pub async fn list_all(
        &self,
        category_id: Option<i64>,
        author: Option<&str>,
        title: Option<&str>,
        page: Option<&str>,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let term = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let filter = PostFilter::All {
            category_id,
            author: term(author),
            title: term(title),
        };
        self.paginate(filter, page).await
    }

    /// Publish or hide a post and move it to another category.
    ///
    /// Callers restrict this to superusers; the author is not consulted.
    pub async fn moderate(
        &self,
        id: i64,
        moderator: &User,
        is_published: bool,
        category_id: i64,
    ) -> Result<Post, PostServiceError> {
        self.get_any(id).await?;
        let category = self
            .category_repo
            .get_by_id(category_id)
            .await
            .context("Failed to get category")?;
        if category.is_none() {
            return Err(PostServiceError::ValidationError(FieldErrors::single(
                "category",
                "Select a valid choice.",
            )));
        }

        let post = self
            .post_repo
            .moderate(id, is_published, category_id)
            .await
            .context("Failed to moderate post")?
            .ok_or(PostServiceError::NotFound)?;
        tracing::info!(
            "User {} set post {} published={} category={}",
            moderator.username,
            id,
            is_published,
            category_id
        );
        Ok(post)
    }

    /// Categories and locations offered by the post form
    pub async fn form_choices(&self) -> Result<(Vec<Category>, Vec<Location>), PostServiceError> {
        let categories = self
            .category_repo
            .list()
            .await
            .context("Failed to list categories")?;
        let locations = self
            .location_repo
            .list()
            .await
            .context("Failed to list locations")?;
        Ok((categories, locations))
    }

    async fn get_any(&self, id: i64) -> Result<Post, PostServiceError> {
        self.post_repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        page: Option<&str>,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let now = Utc::now();
        let total = self
            .post_repo
            .count(&filter, now)
            .await
            .context("Failed to count posts")?;
        let page = resolve_page(page, total, PAGINATION).ok_or(PostServiceError::NotFound)?;
        let params = ListParams::new(page, PAGINATION);
        let posts = self
            .post_repo
            .list(&filter, now, &params)
            .await
            .context("Failed to list posts")?;
        Ok(PagedResult::new(posts, total, &params))
    }

    /// The chosen category and location must exist
    async fn check_references(&self, input: &PostInput) -> Result<(), PostServiceError> {
        let mut errors = FieldErrors::new();

        let category = self
            .category_repo
            .get_by_id(input.category_id)
            .await
            .context("Failed to get category")?;
        if category.is_none() {
            errors.add("category", "Select a valid choice.");
        }

        if let Some(location_id) = input.location_id {
            let location = self
                .location_repo
                .get_by_id(location_id)
                .await
                .context("Failed to get location")?;
            if location.is_none() {
                errors.add("location", "Select a valid choice.");
            }
        }

        errors
            .into_result(())
            .map_err(PostServiceError::ValidationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxLocationRepository, SqlxPostRepository, SqlxUserRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    struct Fixture {
        service: PostService,
        alice: User,
        bob: User,
        admin: User,
        travel: Category,
        hidden: Category,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let mut created = Vec::new();
        for (name, su) in [("alice", false), ("bob", false), ("admin", true)] {
            let user = User::new(name.into(), format!("{name}@example.com"), "h".into(), su);
            created.push(users.create(&user).await.unwrap());
        }
        let admin = created.pop().unwrap();
        let bob = created.pop().unwrap();
        let alice = created.pop().unwrap();

        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let travel = categories
            .create(&Category::new("Travel".into(), String::new(), "travel".into(), true))
            .await
            .unwrap();
        let hidden = categories
            .create(&Category::new("Hidden".into(), String::new(), "hidden".into(), false))
            .await
            .unwrap();

        let service = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            categories,
            SqlxLocationRepository::boxed(pool),
        );

        Fixture {
            service,
            alice,
            bob,
            admin,
            travel,
            hidden,
        }
    }

    fn input(title: &str, category_id: i64, is_published: bool) -> PostInput {
        PostInput {
            title: title.into(),
            text: "text".into(),
            pub_date: Utc::now() - Duration::hours(1),
            category_id,
            location_id: None,
            is_published,
        }
    }

    #[tokio::test]
    async fn test_hidden_post_is_not_found_for_others() {
        let f = setup().await;
        let draft = f
            .service
            .create(&f.alice, input("draft", f.travel.id, false))
            .await
            .unwrap();

        assert!(matches!(
            f.service.get_visible(draft.id, Some(&f.bob)).await,
            Err(PostServiceError::NotFound)
        ));
        assert!(matches!(
            f.service.get_visible(draft.id, None).await,
            Err(PostServiceError::NotFound)
        ));

        let own = f.service.get_visible(draft.id, Some(&f.alice)).await.unwrap();
        assert_eq!(own.title, "draft");
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let f = setup().await;
        assert!(matches!(
            f.service.get_visible(42, Some(&f.alice)).await,
            Err(PostServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_only_owner_or_superuser_modifies() {
        let f = setup().await;
        let post = f
            .service
            .create(&f.alice, input("mine", f.travel.id, true))
            .await
            .unwrap();

        match f.service.update(post.id, &f.bob, input("hacked", f.travel.id, true)).await {
            Err(PostServiceError::NotOwner { post_id }) => assert_eq!(post_id, post.id),
            other => panic!("Expected NotOwner, got {:?}", other),
        }
        assert!(matches!(
            f.service.delete(post.id, &f.bob).await,
            Err(PostServiceError::NotOwner { .. })
        ));

        let edited = f
            .service
            .update(post.id, &f.alice, input("edited", f.travel.id, true))
            .await
            .unwrap();
        assert_eq!(edited.title, "edited");
        assert_eq!(edited.author.id, f.alice.id);

        let deleted = f.service.delete(post.id, &f.admin).await.unwrap();
        assert_eq!(deleted.author.username, "alice");
        assert!(matches!(
            f.service.get_visible(post.id, Some(&f.alice)).await,
            Err(PostServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_validates_references() {
        let f = setup().await;
        let mut bad = input("x", 999, true);
        bad.location_id = Some(999);

        match f.service.create(&f.alice, bad).await {
            Err(PostServiceError::ValidationError(errors)) => {
                assert!(errors.has("category"));
                assert!(errors.has("location"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_category_listing() {
        let f = setup().await;
        f.service
            .create(&f.alice, input("in travel", f.travel.id, true))
            .await
            .unwrap();

        let (category, posts) = f.service.list_by_category("travel", None).await.unwrap();
        assert_eq!(category.id, f.travel.id);
        assert_eq!(posts.total, 1);

        assert!(matches!(
            f.service.list_by_category(&f.hidden.slug, None).await,
            Err(PostServiceError::NotFound)
        ));
        assert!(matches!(
            f.service.list_by_category("nope", None).await,
            Err(PostServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile_listing_depends_on_viewer() {
        let f = setup().await;
        f.service
            .create(&f.alice, input("public", f.travel.id, true))
            .await
            .unwrap();
        f.service
            .create(&f.alice, input("draft", f.travel.id, false))
            .await
            .unwrap();
        f.service
            .create(&f.alice, input("hidden category", f.hidden.id, true))
            .await
            .unwrap();

        let own = f.service.list_by_author(&f.alice, Some(&f.alice), None).await.unwrap();
        assert_eq!(own.total, 3);

        let other = f.service.list_by_author(&f.alice, Some(&f.bob), None).await.unwrap();
        assert_eq!(other.total, 1);

        let anonymous = f.service.list_by_author(&f.alice, None, None).await.unwrap();
        assert_eq!(anonymous.items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_includes_hidden_posts() {
        let f = setup().await;
        f.service
            .create(&f.alice, input("Sunrise draft", f.travel.id, false))
            .await
            .unwrap();
        f.service
            .create(&f.bob, input("Sunset", f.hidden.id, true))
            .await
            .unwrap();

        let all = f.service.list_all(None, None, None, None).await.unwrap();
        assert_eq!(all.total, 2);

        let blank = f.service.list_all(None, Some(" "), Some(""), None).await.unwrap();
        assert_eq!(blank.total, 2);

        let alice = f.service.list_all(None, Some("alice"), None, None).await.unwrap();
        assert_eq!(alice.items[0].title, "Sunrise draft");
        assert_eq!(alice.total, 1);

        let hidden = f
            .service
            .list_all(Some(f.hidden.id), None, Some("sun"), None)
            .await
            .unwrap();
        assert_eq!(hidden.items[0].title, "Sunset");
        assert_eq!(hidden.total, 1);
    }

    #[tokio::test]
    async fn test_moderate_publishes_and_recategorizes() {
        let f = setup().await;
        let draft = f
            .service
            .create(&f.alice, input("draft", f.hidden.id, false))
            .await
            .unwrap();

        let published = f
            .service
            .moderate(draft.id, &f.admin, true, f.travel.id)
            .await
            .unwrap();
        assert!(published.is_published);
        assert_eq!(published.category.id, f.travel.id);
        assert!(f.service.get_visible(draft.id, Some(&f.bob)).await.is_ok());

        match f.service.moderate(draft.id, &f.admin, true, 999).await {
            Err(PostServiceError::ValidationError(errors)) => assert!(errors.has("category")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
        assert!(matches!(
            f.service.moderate(999, &f.admin, true, f.travel.id).await,
            Err(PostServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let f = setup().await;

        let empty = f.service.list_public(Some("1")).await.unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_pages(), 1);

        for i in 0..11 {
            f.service
                .create(&f.alice, input(&format!("p{i}"), f.travel.id, true))
                .await
                .unwrap();
        }

        let first = f.service.list_public(None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next());

        let second = f.service.list_public(Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 1);

        for bad in ["3", "0", "abc"] {
            assert!(matches!(
                f.service.list_public(Some(bad)).await,
                Err(PostServiceError::NotFound)
            ));
        }
    }
}
