//! Visibility and ownership rules
//!
//! Two predicates decide every access question in the blog:
//!
//! - [`can_view_post`]: the author always sees their post; everybody else
//!   only sees it once it is public (see [`Post::is_public`]).
//! - [`can_modify`]: only the author or a superuser may edit or delete a
//!   post or comment.
//!
//! The viewer is passed explicitly, `None` meaning an anonymous visitor.

use chrono::{DateTime, Utc};

use crate::models::{Post, User};

/// Whether `viewer` may read `post` at `now`.
pub fn can_view_post(viewer: Option<&User>, post: &Post, now: DateTime<Utc>) -> bool {
    is_author(viewer, post.author.id) || post.is_public(now)
}

/// Whether `user` may change or delete content written by `author_id`.
pub fn can_modify(user: &User, author_id: i64) -> bool {
    user.id == author_id || user.is_superuser
}

fn is_author(viewer: Option<&User>, author_id: i64) -> bool {
    viewer.map(|u| u.id == author_id).unwrap_or(false)
}
