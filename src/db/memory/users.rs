use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{UpdateUser, User},
};

struct StoredUser {
    user: User,
    key_hash: String,
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<Uuid, StoredUser>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for_username(&self, username: &str) -> Option<Uuid> {
        self.users
            .iter()
            .find(|entry| entry.user.username == username)
            .map(|entry| entry.user.id)
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, user: User, key_hash: String) -> DbResult<User> {
        if self.id_for_username(&user.username).is_some() {
            return Err(DbError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        let id = user.id;
        self.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                key_hash,
            },
        );
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.user.username == username)
            .map(|entry| entry.user.clone()))
    }

    async fn find_by_key_hash(&self, key_hash: &str) -> DbResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.key_hash == key_hash)
            .map(|entry| entry.user.clone()))
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.user.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update(&self, username: &str, input: UpdateUser) -> DbResult<User> {
        let id = self.id_for_username(username).ok_or(DbError::NotFound)?;
        let mut entry = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(email) = input.email {
            entry.user.email = email;
        }
        if let Some(role) = input.role {
            entry.user.role = role;
        }
        entry.user.updated_at = Utc::now();
        Ok(entry.user.clone())
    }

    async fn delete(&self, username: &str) -> DbResult<()> {
        let id = self.id_for_username(username).ok_or(DbError::NotFound)?;
        self.users.remove(&id);
        Ok(())
    }

    async fn set_key(
        &self,
        username: &str,
        key_hash: String,
        key_prefix: String,
    ) -> DbResult<User> {
        let id = self.id_for_username(username).ok_or(DbError::NotFound)?;
        let mut entry = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        entry.key_hash = key_hash;
        entry.user.key_prefix = key_prefix;
        entry.user.updated_at = Utc::now();
        Ok(entry.user.clone())
    }

    async fn count(&self) -> DbResult<usize> {
        Ok(self.users.len())
    }
}
