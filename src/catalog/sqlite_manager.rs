use crate::catalog::manager::{CatalogManager, DatasetRecord, UserRecord};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::fmt::{self, Debug, Formatter};

pub struct SqliteCatalogManager {
    pool: SqlitePool,
    catalog_path: String,
}

impl Debug for SqliteCatalogManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCatalogManager")
            .field("catalog_path", &self.catalog_path)
            .finish()
    }
}

impl SqliteCatalogManager {
    /// Open (or create) the catalog database at `db_path` and ensure the
    /// schema exists.
    pub async fn new(db_path: &str) -> Result<Self> {
        let uri = format!("sqlite:{}?mode=rwc", db_path);
        let pool = SqlitePool::connect(&uri).await?;
        Self::initialize_schema(&pool).await?;

        Ok(Self {
            pool,
            catalog_path: db_path.to_string(),
        })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'member',
                created_at TIMESTAMP NOT NULL
            )
        "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS datasets (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id)
            )
        "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogManager for SqliteCatalogManager {
    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    async fn create_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn update_user_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        if name.is_some() {
            sets.push("name = ?");
        }
        if email.is_some() {
            sets.push("email = ?");
        }
        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(name) = name {
            query = query.bind(name);
        }
        if let Some(email) = email {
            query = query.bind(email);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_user_password(&self, id: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_user_role(&self, id: &str, role: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, role, created_at FROM users \
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn create_dataset(&self, dataset: &DatasetRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO datasets (id, owner_id, name, storage_path, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&dataset.id)
        .bind(&dataset.owner_id)
        .bind(&dataset.name)
        .bind(&dataset.storage_path)
        .bind(dataset.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_dataset_for_owner(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<DatasetRecord>> {
        sqlx::query_as::<_, DatasetRecord>(
            "SELECT id, owner_id, name, storage_path, created_at FROM datasets \
             WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_datasets_for_owner(&self, owner_id: &str) -> Result<Vec<DatasetRecord>> {
        sqlx::query_as::<_, DatasetRecord>(
            "SELECT id, owner_id, name, storage_path, created_at FROM datasets \
             WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}
