use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt::Debug;

/// A registered account.
///
/// `password_hash` stays server-side; wire responses go through the DTOs in
/// `http::models` instead of serializing this record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// An uploaded dataset owned by a user. `storage_path` is the blob key
/// `{owner_id}/{filename}`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DatasetRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Async interface for catalog operations.
#[async_trait]
pub trait CatalogManager: Debug + Send + Sync {
    /// Close the catalog connection. This is idempotent and can be called multiple times.
    async fn close(&self) -> Result<()> {
        // Default implementation does nothing - sqlx pools handle cleanup automatically
        Ok(())
    }

    // Users

    async fn create_user(&self, user: &UserRecord) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Update name and/or email. Returns false when the user does not exist
    /// or no field was given.
    async fn update_user_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool>;

    /// Replace the stored password hash. Returns false when the user does
    /// not exist.
    async fn update_user_password(&self, id: &str, password_hash: &str) -> Result<bool>;

    /// Change a user's role. Returns false when the user does not exist.
    async fn set_user_role(&self, id: &str, role: &str) -> Result<bool>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    // Datasets

    async fn create_dataset(&self, dataset: &DatasetRecord) -> Result<()>;

    /// Fetch a dataset only if it belongs to the given owner.
    async fn get_dataset_for_owner(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<DatasetRecord>>;

    /// All datasets of one owner, newest first.
    async fn list_datasets_for_owner(&self, owner_id: &str) -> Result<Vec<DatasetRecord>>;
}
