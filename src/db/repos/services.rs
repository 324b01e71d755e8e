use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{Service, UpdateService},
};

#[async_trait]
pub trait ServiceRepo: Send + Sync {
    /// Fails with `Conflict` if the catalog name is taken.
    async fn insert(&self, service: Service) -> DbResult<Service>;
    async fn get_by_name(&self, name: &str) -> DbResult<Option<Service>>;
    async fn list(&self) -> DbResult<Vec<Service>>;
    async fn update(&self, name: &str, input: UpdateService) -> DbResult<Service>;
    async fn delete(&self, name: &str) -> DbResult<()>;
}
