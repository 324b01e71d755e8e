use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{OrgKeyMatch, OrganizationRepo},
    },
    models::{OrgApiKey, OrgMember, OrgUserRole, Organization, UpdateOrganization},
};

struct StoredOrgKey {
    key: OrgApiKey,
    key_hash: String,
}

#[derive(Default)]
pub struct MemoryOrganizationRepo {
    orgs: DashMap<Uuid, Organization>,
    // Keys live beside the organization record, keyed by org id.
    keys: DashMap<Uuid, Vec<StoredOrgKey>>,
}

impl MemoryOrganizationRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepo for MemoryOrganizationRepo {
    async fn insert(&self, org: Organization) -> DbResult<Organization> {
        let id = org.id;
        self.orgs.insert(id, org.clone());
        self.keys.entry(id).or_default();
        Ok(org)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>> {
        Ok(self.orgs.get(&id).map(|o| o.clone()))
    }

    async fn list(&self) -> DbResult<Vec<Organization>> {
        let mut orgs: Vec<Organization> = self.orgs.iter().map(|o| o.clone()).collect();
        orgs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orgs)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> DbResult<Organization> {
        let mut org = self.orgs.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(name) = input.name {
            org.name = name;
        }
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.orgs.remove(&id).ok_or(DbError::NotFound)?;
        self.keys.remove(&id);
        Ok(())
    }

    async fn find_by_key_hash(&self, key_hash: &str) -> DbResult<Option<OrgKeyMatch>> {
        for entry in self.keys.iter() {
            let matched = entry
                .value()
                .iter()
                .find(|stored| stored.key_hash == key_hash && !stored.key.is_revoked());
            if let Some(stored) = matched {
                let org = self
                    .orgs
                    .get(entry.key())
                    .map(|o| o.clone())
                    .ok_or_else(|| {
                        DbError::Internal("API key references a missing organization".to_string())
                    })?;
                return Ok(Some(OrgKeyMatch {
                    organization: org,
                    scope: stored.key.scope,
                    key_id: stored.key.id,
                }));
            }
        }
        Ok(None)
    }

    async fn add_member(
        &self,
        id: Uuid,
        username: String,
        role: OrgUserRole,
    ) -> DbResult<Organization> {
        let mut org = self.orgs.get_mut(&id).ok_or(DbError::NotFound)?;
        if role == OrgUserRole::Owner {
            return Err(DbError::Validation(
                "The owner role is derived from ownership and cannot be granted".to_string(),
            ));
        }
        if org.owner == username {
            return Err(DbError::Conflict(format!(
                "'{}' already owns this organization",
                username
            )));
        }
        if org.member_role(&username).is_some() {
            return Err(DbError::Conflict(format!(
                "'{}' is already a member",
                username
            )));
        }
        org.members.push(OrgMember { username, role });
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn update_member(
        &self,
        id: Uuid,
        username: &str,
        role: OrgUserRole,
    ) -> DbResult<Organization> {
        let mut org = self.orgs.get_mut(&id).ok_or(DbError::NotFound)?;
        if role == OrgUserRole::Owner {
            return Err(DbError::Validation(
                "The owner role is derived from ownership and cannot be granted".to_string(),
            ));
        }
        let member = org
            .members
            .iter_mut()
            .find(|m| m.username == username)
            .ok_or(DbError::NotFound)?;
        member.role = role;
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn remove_member(&self, id: Uuid, username: &str) -> DbResult<Organization> {
        let mut org = self.orgs.get_mut(&id).ok_or(DbError::NotFound)?;
        let before = org.members.len();
        org.members.retain(|m| m.username != username);
        if org.members.len() == before {
            return Err(DbError::NotFound);
        }
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn add_key(&self, id: Uuid, key: OrgApiKey, key_hash: String) -> DbResult<OrgApiKey> {
        if !self.orgs.contains_key(&id) {
            return Err(DbError::NotFound);
        }
        let mut keys = self.keys.entry(id).or_default();
        keys.push(StoredOrgKey {
            key: key.clone(),
            key_hash,
        });
        Ok(key)
    }

    async fn revoke_key(&self, id: Uuid, key_id: Uuid) -> DbResult<OrgApiKey> {
        let mut keys = self.keys.get_mut(&id).ok_or(DbError::NotFound)?;
        let stored = keys
            .iter_mut()
            .find(|stored| stored.key.id == key_id)
            .ok_or(DbError::NotFound)?;
        if stored.key.revoked_at.is_none() {
            stored.key.revoked_at = Some(Utc::now());
        }
        Ok(stored.key.clone())
    }

    async fn list_keys(&self, id: Uuid) -> DbResult<Vec<OrgApiKey>> {
        if !self.orgs.contains_key(&id) {
            return Err(DbError::NotFound);
        }
        Ok(self
            .keys
            .get(&id)
            .map(|keys| keys.iter().map(|s| s.key.clone()).collect())
            .unwrap_or_default())
    }
}
