//! Category and location admin forms

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{checkbox, max_chars, required, FieldErrors};
use crate::models::{Category, CategoryInput, Location, LocationInput};

static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: Option<String>,
}

impl CategoryForm {
    pub fn from_category(category: &Category) -> Self {
        Self {
            title: category.title.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            is_published: category.is_published.then(|| "on".to_string()),
        }
    }

    /// Slug uniqueness is checked by the service
    pub fn validate(&self) -> Result<CategoryInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(&mut errors, "title", &self.title);
        max_chars(&mut errors, "title", &title, 256);

        let slug = required(&mut errors, "slug", &self.slug);
        max_chars(&mut errors, "slug", &slug, 64);
        if !slug.is_empty() && !SLUG_RE.is_match(&slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }

        errors.into_result(CategoryInput {
            title,
            description: self.description.trim().to_string(),
            slug,
            is_published: checkbox(&self.is_published),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationForm {
    pub name: String,
    pub is_published: Option<String>,
}

impl LocationForm {
    pub fn from_location(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            is_published: location.is_published.then(|| "on".to_string()),
        }
    }

    pub fn validate(&self) -> Result<LocationInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", &self.name);
        max_chars(&mut errors, "name", &name, 256);
        errors.into_result(LocationInput {
            name,
            is_published: checkbox(&self.is_published),
        })
    }
}
