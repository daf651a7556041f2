//! Location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A place a post may be tagged with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String, is_published: bool) -> Self {
        Self {
            id: 0,
            name,
            is_published,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating or updating a location
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInput {
    pub name: String,
    pub is_published: bool,
}

/// Location fields embedded in a post row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}
