//! Accounts and access tokens.
//!
//! [`IdentityProvider`] owns every credential decision: registration, login,
//! token validation, profile updates, password rotation, and the admin-only
//! user listing. Handlers never touch hashes or token internals directly.

pub mod password;
pub mod token;

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{CatalogManager, UserRecord};
use crate::id::generate_user_id;

pub use token::Claims;

/// User role values.
pub mod roles {
    /// Default role for new registrations.
    pub const MEMBER: &str = "member";
    /// Role allowed to list all users.
    pub const ADMIN: &str = "admin";
}

/// Resolved auth configuration: the signing key and token lifetime.
///
/// Constructed once at engine build time and injected here; nothing in the
/// request path reads the environment.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret_key: String,
    pub token_ttl_minutes: i64,
}

/// Errors from identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Not authorized")]
    Forbidden,

    #[error("Incorrect current password")]
    WrongPassword,

    #[error("Failed to update user")]
    UpdateFailed,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token issuing failed: {0}")]
    Token(jsonwebtoken::errors::Error),

    #[error("catalog error: {0}")]
    Catalog(anyhow::Error),
}

impl AuthError {
    /// Returns true for failures that should carry a `WWW-Authenticate`
    /// challenge (401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::InvalidToken)
    }
}

/// Registration, login, and account management over the catalog.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    catalog: Arc<dyn CatalogManager>,
    settings: AuthSettings,
}

impl IdentityProvider {
    pub fn new(catalog: Arc<dyn CatalogManager>, settings: AuthSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Create an account and issue its first token.
    ///
    /// New users get the `member` role. The email must be unused.
    pub async fn register(
        &self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<(UserRecord, String), AuthError> {
        let existing = self
            .catalog
            .get_user_by_email(email)
            .await
            .map_err(AuthError::Catalog)?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = UserRecord {
            id: generate_user_id(),
            name: name.map(|n| n.to_string()),
            email: email.to_string(),
            password_hash: password::hash_password(password)?,
            role: roles::MEMBER.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.catalog
            .create_user(&user)
            .await
            .map_err(AuthError::Catalog)?;

        let token = self.issue_token(&user.id)?;
        Ok((user, token))
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password fail identically, so callers cannot
    /// probe which emails exist.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserRecord, String), AuthError> {
        let user = self
            .catalog
            .get_user_by_email(email)
            .await
            .map_err(AuthError::Catalog)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user.id)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to its user.
    pub async fn current_user(&self, token: &str) -> Result<UserRecord, AuthError> {
        let claims = token::decode_token(&self.settings.secret_key, token)
            .map_err(|_| AuthError::InvalidToken)?;
        self.catalog
            .get_user(&claims.sub)
            .await
            .map_err(AuthError::Catalog)?
            .ok_or(AuthError::InvalidToken)
    }

    /// Update name and/or email, returning the updated record.
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRecord, AuthError> {
        let updated = self
            .catalog
            .update_user_profile(user_id, name, email)
            .await
            .map_err(AuthError::Catalog)?;
        if !updated {
            return Err(AuthError::UpdateFailed);
        }
        self.catalog
            .get_user(user_id)
            .await
            .map_err(AuthError::Catalog)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Rotate a password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .catalog
            .get_user(user_id)
            .await
            .map_err(AuthError::Catalog)?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(old_password, &user.password_hash)? {
            return Err(AuthError::WrongPassword);
        }

        let new_hash = password::hash_password(new_password)?;
        let updated = self
            .catalog
            .update_user_password(user_id, &new_hash)
            .await
            .map_err(AuthError::Catalog)?;
        if !updated {
            return Err(AuthError::Catalog(anyhow::anyhow!(
                "password update affected no rows"
            )));
        }
        Ok(())
    }

    /// List all users. Admin only.
    pub async fn list_users(&self, requester: &UserRecord) -> Result<Vec<UserRecord>, AuthError> {
        if requester.role != roles::ADMIN {
            return Err(AuthError::Forbidden);
        }
        self.catalog.list_users().await.map_err(AuthError::Catalog)
    }

    fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        token::issue_token(
            &self.settings.secret_key,
            user_id,
            self.settings.token_ttl_minutes,
        )
        .map_err(AuthError::Token)
    }
}
