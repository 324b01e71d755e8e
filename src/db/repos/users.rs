use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{UpdateUser, User},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user with the hash of its freshly issued API key.
    /// Fails with `Conflict` if the username is taken.
    async fn insert(&self, user: User, key_hash: String) -> DbResult<User>;
    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>>;
    /// Exact-match lookup by API key hash.
    async fn find_by_key_hash(&self, key_hash: &str) -> DbResult<Option<User>>;
    async fn list(&self) -> DbResult<Vec<User>>;
    async fn update(&self, username: &str, input: UpdateUser) -> DbResult<User>;
    async fn delete(&self, username: &str) -> DbResult<()>;
    /// Replace the user's API key (rotation). The old key stops matching
    /// immediately.
    async fn set_key(&self, username: &str, key_hash: String, key_prefix: String)
    -> DbResult<User>;
    async fn count(&self) -> DbResult<usize>;
}
