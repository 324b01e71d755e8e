use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Contract};

#[async_trait]
pub trait ContractRepo: Send + Sync {
    async fn insert(&self, contract: Contract) -> DbResult<Contract>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Contract>>;
    async fn list(&self) -> DbResult<Vec<Contract>>;
    async fn list_for_organization(&self, organization_id: Uuid) -> DbResult<Vec<Contract>>;
    /// The active contract binding an organization to a service, if any.
    async fn active_for(
        &self,
        organization_id: Uuid,
        service_id: Uuid,
    ) -> DbResult<Option<Contract>>;
    async fn terminate(&self, id: Uuid) -> DbResult<Contract>;
}
