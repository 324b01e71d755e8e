use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{OrgApiKey, OrgKeyScope, OrgUserRole, Organization, UpdateOrganization},
};

/// Result of resolving an organization API key: the organization plus the
/// scope of the specific key that matched.
#[derive(Debug, Clone)]
pub struct OrgKeyMatch {
    pub organization: Organization,
    pub scope: OrgKeyScope,
    pub key_id: Uuid,
}

#[async_trait]
pub trait OrganizationRepo: Send + Sync {
    async fn insert(&self, org: Organization) -> DbResult<Organization>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>>;
    async fn list(&self) -> DbResult<Vec<Organization>>;
    async fn update(&self, id: Uuid, input: UpdateOrganization) -> DbResult<Organization>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    /// Exact-match lookup across all organizations' non-revoked keys.
    /// Resolves the matched key's scope, never an organization-wide default.
    async fn find_by_key_hash(&self, key_hash: &str) -> DbResult<Option<OrgKeyMatch>>;

    async fn add_member(&self, id: Uuid, username: String, role: OrgUserRole)
    -> DbResult<Organization>;
    async fn update_member(
        &self,
        id: Uuid,
        username: &str,
        role: OrgUserRole,
    ) -> DbResult<Organization>;
    async fn remove_member(&self, id: Uuid, username: &str) -> DbResult<Organization>;

    async fn add_key(&self, id: Uuid, key: OrgApiKey, key_hash: String) -> DbResult<OrgApiKey>;
    async fn revoke_key(&self, id: Uuid, key_id: Uuid) -> DbResult<OrgApiKey>;
    async fn list_keys(&self, id: Uuid) -> DbResult<Vec<OrgApiKey>>;
}
