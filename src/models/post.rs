//! Post model
//!
//! A post always has an author and a category and may carry a location.
//! Whether the public may see it depends on three flags at once: the post's
//! own `is_published`, its `pub_date` and its category's `is_published`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryRef, LocationRef, UserRef};

/// Post entity with its related rows already loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    pub title: String,
    /// Body text (plain text, rendered with line breaks)
    pub text: String,
    /// Publication date; posts dated in the future are scheduled
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author: UserRef,
    pub category: CategoryRef,
    pub location: Option<LocationRef>,
    /// Number of comments on the post
    pub comment_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// True when anyone, signed in or not, may read the post at `now`.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.pub_date <= now && self.category.is_published
    }

    /// The location to display, if it is set and published
    pub fn visible_location(&self) -> Option<&LocationRef> {
        self.location.as_ref().filter(|l| l.is_published)
    }
}

/// Validated post fields, as written by the create and update handlers.
///
/// The author is deliberately absent: it always comes from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: i64,
    pub location_id: Option<i64>,
    pub is_published: bool,
}
