use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{Database, DbError, DbResult},
    models::{
        CreateOrgApiKey, CreateOrganization, CreatedOrgApiKey, OrgApiKey, OrgUserRole,
        Organization, UpdateOrganization, generate_key,
    },
};

/// Organizations, their memberships, and their API keys.
#[derive(Clone)]
pub struct OrganizationService {
    db: Arc<Database>,
    key_prefix: String,
}

impl OrganizationService {
    pub fn new(db: Arc<Database>, key_prefix: String) -> Self {
        Self { db, key_prefix }
    }

    pub async fn create(
        &self,
        input: CreateOrganization,
        owner: String,
    ) -> DbResult<Organization> {
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: input.name,
            owner,
            members: vec![],
            created_at: now,
            updated_at: now,
        };
        let org = self.db.organizations().insert(org).await?;
        tracing::info!(organization = %org.name, owner = %org.owner, "Created organization");
        Ok(org)
    }

    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>> {
        self.db.organizations().get_by_id(id).await
    }

    pub async fn list(&self) -> DbResult<Vec<Organization>> {
        self.db.organizations().list().await
    }

    pub async fn update(&self, id: Uuid, input: UpdateOrganization) -> DbResult<Organization> {
        self.db.organizations().update(id, input).await
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.db.organizations().delete(id).await
    }

    /// Add a member. The username must belong to an existing user account.
    pub async fn add_member(
        &self,
        id: Uuid,
        username: String,
        role: OrgUserRole,
    ) -> DbResult<Organization> {
        if self.db.users().get_by_username(&username).await?.is_none() {
            return Err(DbError::Validation(format!(
                "No user account named '{}'",
                username
            )));
        }
        self.db.organizations().add_member(id, username, role).await
    }

    pub async fn update_member(
        &self,
        id: Uuid,
        username: &str,
        role: OrgUserRole,
    ) -> DbResult<Organization> {
        self.db
            .organizations()
            .update_member(id, username, role)
            .await
    }

    pub async fn remove_member(&self, id: Uuid, username: &str) -> DbResult<Organization> {
        self.db.organizations().remove_member(id, username).await
    }

    /// Issue a new API key for the organization. The raw key appears only
    /// in the returned value.
    pub async fn create_key(
        &self,
        id: Uuid,
        input: CreateOrgApiKey,
    ) -> DbResult<CreatedOrgApiKey> {
        let key = generate_key(&self.key_prefix);
        let record = OrgApiKey {
            id: Uuid::new_v4(),
            name: input.name,
            key_prefix: key.display_prefix,
            scope: input.scope,
            created_at: Utc::now(),
            revoked_at: None,
        };
        let record = self.db.organizations().add_key(id, record, key.hash).await?;
        tracing::info!(
            organization_id = %id,
            key = %record.name,
            scope = %record.scope,
            "Issued organization API key"
        );
        Ok(CreatedOrgApiKey {
            key: record,
            api_key: key.raw,
        })
    }

    pub async fn revoke_key(&self, id: Uuid, key_id: Uuid) -> DbResult<OrgApiKey> {
        let key = self.db.organizations().revoke_key(id, key_id).await?;
        tracing::info!(organization_id = %id, key = %key.name, "Revoked organization API key");
        Ok(key)
    }

    pub async fn list_keys(&self, id: Uuid) -> DbResult<Vec<OrgApiKey>> {
        self.db.organizations().list_keys(id).await
    }
}
