use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::BootstrapAdmin,
    db::{Database, DbResult},
    models::{CreateUser, CreatedUser, UpdateUser, User, UserRole, generate_key, hash_key},
};

/// User accounts and their API keys.
#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    key_prefix: String,
}

impl UserService {
    pub fn new(db: Arc<Database>, key_prefix: String) -> Self {
        Self { db, key_prefix }
    }

    /// Create a user and issue its API key. The raw key appears only in the
    /// returned value.
    pub async fn create(&self, input: CreateUser) -> DbResult<CreatedUser> {
        let key = generate_key(&self.key_prefix);
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            role: input.role,
            key_prefix: key.display_prefix.clone(),
            created_at: now,
            updated_at: now,
        };
        let user = self.db.users().insert(user, key.hash).await?;
        tracing::info!(username = %user.username, role = %user.role, "Created user");
        Ok(CreatedUser {
            user,
            api_key: key.raw,
        })
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.db.users().get_by_username(username).await
    }

    pub async fn list(&self) -> DbResult<Vec<User>> {
        self.db.users().list().await
    }

    pub async fn update(&self, username: &str, input: UpdateUser) -> DbResult<User> {
        self.db.users().update(username, input).await
    }

    pub async fn delete(&self, username: &str) -> DbResult<()> {
        self.db.users().delete(username).await
    }

    /// Replace the user's API key. The previous key stops working the
    /// moment this returns.
    pub async fn rotate_key(&self, username: &str) -> DbResult<CreatedUser> {
        let key = generate_key(&self.key_prefix);
        let user = self
            .db
            .users()
            .set_key(username, key.hash, key.display_prefix)
            .await?;
        tracing::info!(username = %user.username, "Rotated user API key");
        Ok(CreatedUser {
            user,
            api_key: key.raw,
        })
    }

    /// Create the configured platform admin when the user store is empty.
    /// Returns the created user, or `None` when the store already has users.
    pub async fn bootstrap(&self, bootstrap: &BootstrapAdmin) -> DbResult<Option<User>> {
        if self.db.users().count().await? > 0 {
            return Ok(None);
        }
        let raw = bootstrap.api_key.as_str();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            role: UserRole::Admin,
            key_prefix: raw[..raw.len().min(12)].to_string(),
            created_at: now,
            updated_at: now,
        };
        let user = self.db.users().insert(user, hash_key(raw)).await?;
        tracing::warn!(username = %user.username, "Bootstrapped platform admin from config");
        Ok(Some(user))
    }
}
