//! Category service
//!
//! Category administration for superusers: list, create, edit. Slugs must
//! be unique; titles need not be.

use crate::db::repositories::CategoryRepository;
use crate::forms::FieldErrors;
use crate::models::{Category, CategoryInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// All categories, including unpublished ones
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    pub async fn get(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound(id))
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category, CategoryServiceError> {
        self.ensure_slug_free(&input.slug, None).await?;
        let category = Category::new(input.title, input.description, input.slug, input.is_published);
        let created = self
            .repo
            .create(&category)
            .await
            .context("Failed to create category")?;
        tracing::info!("Created category {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        input: CategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        self.get(id).await?;
        self.ensure_slug_free(&input.slug, Some(id)).await?;
        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update category")?
            .ok_or(CategoryServiceError::NotFound(id))?;
        tracing::info!("Updated category {} ({})", updated.slug, id);
        Ok(updated)
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), CategoryServiceError> {
        let taken = self
            .repo
            .exists_by_slug(slug, exclude_id)
            .await
            .context("Failed to check slug")?;
        if taken {
            return Err(CategoryServiceError::ValidationError(FieldErrors::single(
                "slug",
                "Category with this slug already exists.",
            )));
        }
        Ok(())
    }
}
