//! Mock catalog implementation for testing.
//!
//! Provides a configurable mock implementation of `CatalogManager` that can be used
//! in tests to avoid needing a real database.

use super::{CatalogManager, DatasetRecord, UserRecord};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Mock catalog that can be configured to fail for testing error handling.
#[derive(Debug, Default)]
pub struct MockCatalog {
    users: Mutex<HashMap<String, UserRecord>>,
    datasets: Mutex<HashMap<String, DatasetRecord>>,
    fail_create_dataset: AtomicBool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether dataset creation should fail.
    pub fn set_fail_create_dataset(&self, fail: bool) {
        self.fail_create_dataset.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogManager for MockCatalog {
    async fn create_user(&self, user: &UserRecord) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            anyhow::bail!("email '{}' already exists", user.email);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool> {
        if name.is_none() && email.is_none() {
            return Ok(false);
        }
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user) => {
                if let Some(name) = name {
                    user.name = Some(name.to_string());
                }
                if let Some(email) = email {
                    user.email = email.to_string();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_user_password(&self, id: &str, password_hash: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_user_role(&self, id: &str, role: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user) => {
                user.role = role.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn create_dataset(&self, dataset: &DatasetRecord) -> Result<()> {
        if self.fail_create_dataset.load(Ordering::SeqCst) {
            anyhow::bail!("induced create_dataset failure");
        }
        self.datasets
            .lock()
            .unwrap()
            .insert(dataset.id.clone(), dataset.clone());
        Ok(())
    }

    async fn get_dataset_for_owner(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<DatasetRecord>> {
        Ok(self
            .datasets
            .lock()
            .unwrap()
            .get(id)
            .filter(|d| d.owner_id == owner_id)
            .cloned())
    }

    async fn list_datasets_for_owner(&self, owner_id: &str) -> Result<Vec<DatasetRecord>> {
        let mut datasets: Vec<DatasetRecord> = self
            .datasets
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        datasets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(datasets)
    }
}
