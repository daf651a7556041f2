//! Category model
//!
//! Posts are grouped into categories. A hidden (unpublished) category hides
//! every post filed under it from the public listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category title
    pub title: String,
    pub description: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Unpublished categories hide their posts
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category; the ID is assigned by the database.
    pub fn new(title: String, description: String, slug: String, is_published: bool) -> Self {
        Self {
            id: 0,
            title,
            description,
            slug,
            is_published,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating or updating a category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

/// Category fields embedded in a post row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            slug: category.slug.clone(),
            is_published: category.is_published,
        }
    }
}
