//! User model
//!
//! Registered accounts. Users author posts and comments; superusers may
//! additionally edit or delete anybody's content and manage categories and
//! locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Superusers bypass ownership checks
    pub is_superuser: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed, see
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, is_superuser: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_superuser,
            created_at: Utc::now(),
        }
    }

    /// "First Last", falling back to the username when both are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}

/// Editable profile fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserInput {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Compact author reference embedded in posts and comments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hashed_password".to_string(),
            false,
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "testuser");
        assert!(user.first_name.is_empty());
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_display_name() {
        let mut user = User::new("alice".into(), "a@example.com".into(), "h".into(), false);
        assert_eq!(user.display_name(), "alice");

        user.first_name = "Alice".into();
        assert_eq!(user.display_name(), "Alice");

        user.last_name = "Liddell".into();
        assert_eq!(user.display_name(), "Alice Liddell");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("bob".into(), "b@example.com".into(), "secret-hash".into(), true);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"is_superuser\":true"));
    }
}
