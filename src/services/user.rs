//! User service
//!
//! Implements business logic for accounts:
//! - Registration (the first user becomes a superuser)
//! - Login/logout with server-side sessions
//! - Session validation and cleanup
//! - Profile updates

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::forms::FieldErrors;
use crate::models::{CreateUserInput, Session, UpdateUserInput, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

/// Default session lifetime in days
const DEFAULT_SESSION_LIFETIME_DAYS: i64 = 14;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Input rejected; messages are keyed by form field
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime: Duration,
}

impl UserService {
    /// Create a new user service with the default session lifetime
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_lifetime(user_repo, session_repo, DEFAULT_SESSION_LIFETIME_DAYS)
    }

    /// Create a new user service whose sessions last `days` days
    pub fn with_session_lifetime(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime: Duration::days(days),
        }
    }

    /// Register a new user.
    ///
    /// The very first account becomes a superuser.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the username is already taken
    /// - `InternalError` for database errors
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::ValidationError(FieldErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let is_first = self.is_first_user().await?;
        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.username, input.email, password_hash, is_first);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(
            "Registered user {} (id {}, superuser: {})",
            created.username,
            created.id,
            created.is_superuser
        );
        Ok(created)
    }

    /// Check credentials and open a new session.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` if the username is unknown or the password is wrong
    /// - `InternalError` for database errors
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let invalid =
            || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .user_repo
            .get_by_username(username.trim())
            .await
            .context("Failed to get user")?
            .ok_or_else(invalid)?;

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            tracing::warn!("Failed login attempt for {}", user.username);
            return Err(invalid());
        }

        let session = self.create_session(user.id).await?;
        tracing::info!("User {} logged in", user.username);
        Ok((user, session))
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens give `None`; expired sessions are deleted.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;
        Ok(user)
    }

    /// Delete every expired session; returns how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        let removed = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(removed)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;
        Ok(user)
    }

    /// Update the profile of `user` (always the signed-in account).
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the new username belongs to someone else
    /// - `NotFound` if the account disappeared meanwhile
    pub async fn update_profile(
        &self,
        user: &User,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        if input.username != user.username {
            let taken = self
                .user_repo
                .get_by_username(&input.username)
                .await
                .context("Failed to check username")?
                .map(|other| other.id != user.id)
                .unwrap_or(false);
            if taken {
                return Err(UserServiceError::ValidationError(FieldErrors::single(
                    "username",
                    USERNAME_TAKEN,
                )));
            }
        }

        let updated = self
            .user_repo
            .update_profile(user.id, &input)
            .await
            .context("Failed to update profile")?
            .ok_or(UserServiceError::NotFound)?;

        tracing::info!("User {} updated their profile", updated.username);
        Ok(updated)
    }

    /// Check if no account exists yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;
        Ok(count == 0)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::new(Uuid::new_v4().to_string(), user_id, self.session_lifetime);
        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        Ok(created)
    }
}
