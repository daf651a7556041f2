//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserRef;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    /// The post being commented on; always taken from the URL
    pub post_id: i64,
    pub author: UserRef,
    pub created_at: DateTime<Utc>,
}
