//! Credential resolution: raw API key to per-request identity.
//!
//! The key prefix is the sole discriminator of credential kind. Keys are
//! compared by SHA-256 hash; the raw key is never persisted or retained on
//! the identity. Resolution either produces a complete identity or fails:
//! there is no partially populated state, and a failed lookup stops the
//! request before any permission-table lookup runs.

use std::sync::Arc;

use super::{Identity, OrganizationIdentity, UserIdentity, error::AuthError};
use crate::{
    config::AuthConfig,
    db::Database,
    models::{has_key_prefix, hash_key},
};

#[derive(Clone)]
pub struct CredentialResolver {
    db: Arc<Database>,
    user_prefix: String,
    org_prefix: String,
}

impl CredentialResolver {
    pub fn new(db: Arc<Database>, auth: &AuthConfig) -> Self {
        Self {
            db,
            user_prefix: auth.user_key_prefix.clone(),
            org_prefix: auth.org_key_prefix.clone(),
        }
    }

    /// Resolve an optional raw key into an identity.
    ///
    /// No key means `Anonymous`; whether that is acceptable is decided
    /// downstream against the permission table's `public` flag.
    pub async fn resolve(&self, raw_key: Option<&str>) -> Result<Identity, AuthError> {
        let Some(raw_key) = raw_key else {
            return Ok(Identity::Anonymous);
        };

        if has_key_prefix(raw_key, &self.user_prefix) {
            self.resolve_user(raw_key).await
        } else if has_key_prefix(raw_key, &self.org_prefix) {
            self.resolve_organization(raw_key).await
        } else {
            tracing::debug!("API key with unrecognized prefix rejected");
            Err(AuthError::UnrecognizedKeyFormat)
        }
    }

    async fn resolve_user(&self, raw_key: &str) -> Result<Identity, AuthError> {
        let hash = hash_key(raw_key);
        let user = self
            .db
            .users()
            .find_by_key_hash(&hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidUserApiKey)?;

        tracing::debug!(username = %user.username, role = %user.role, "Resolved user API key");
        Ok(Identity::User(UserIdentity {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }))
    }

    async fn resolve_organization(&self, raw_key: &str) -> Result<Identity, AuthError> {
        let hash = hash_key(raw_key);
        // The lookup also resolves which of the organization's keys matched;
        // that key's scope is authoritative for this request.
        let matched = self
            .db
            .organizations()
            .find_by_key_hash(&hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidOrgApiKey)?;

        tracing::debug!(
            organization = %matched.organization.name,
            key_id = %matched.key_id,
            scope = %matched.scope,
            "Resolved organization API key"
        );
        let org = matched.organization;
        Ok(Identity::Organization(OrganizationIdentity {
            organization_id: org.id,
            name: org.name,
            scope: matched.scope,
            owner: org.owner,
            members: org.members,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AuthConfig,
        models::{CreateOrgApiKey, CreateOrganization, CreateUser, OrgKeyScope, UserRole},
        services::Services,
    };

    async fn setup() -> (Arc<Database>, CredentialResolver, Services) {
        let db = Arc::new(Database::in_memory());
        let resolver = CredentialResolver::new(db.clone(), &AuthConfig::default());
        let services = Services::new(db.clone(), &AuthConfig::default());
        (db, resolver, services)
    }

    #[tokio::test]
    async fn no_key_resolves_to_anonymous() {
        let (_db, resolver, _services) = setup().await;
        let identity = resolver.resolve(None).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn unknown_prefix_is_rejected() {
        let (_db, resolver, _services) = setup().await;
        let err = resolver.resolve(Some("sk_something")).await.unwrap_err();
        assert!(matches!(err, AuthError::UnrecognizedKeyFormat));
    }

    #[tokio::test]
    async fn valid_user_key_resolves() {
        let (_db, resolver, services) = setup().await;
        let created = services
            .users
            .create(CreateUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                role: UserRole::Admin,
            })
            .await
            .unwrap();

        let identity = resolver.resolve(Some(&created.api_key)).await.unwrap();
        let user = identity.as_user().expect("user identity");
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn unknown_user_key_fails() {
        let (_db, resolver, _services) = setup().await;
        let err = resolver
            .resolve(Some("usr_does_not_exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidUserApiKey));
    }

    #[tokio::test]
    async fn org_key_resolves_with_matched_key_scope() {
        let (_db, resolver, services) = setup().await;
        let org = services
            .organizations
            .create(
                CreateOrganization {
                    name: "Acme".to_string(),
                },
                "alice".to_string(),
            )
            .await
            .unwrap();

        let management = services
            .organizations
            .create_key(
                org.id,
                CreateOrgApiKey {
                    name: "ops".to_string(),
                    scope: OrgKeyScope::Management,
                },
            )
            .await
            .unwrap();
        let evaluation = services
            .organizations
            .create_key(
                org.id,
                CreateOrgApiKey {
                    name: "ci".to_string(),
                    scope: OrgKeyScope::Evaluation,
                },
            )
            .await
            .unwrap();

        // Two keys on the same organization resolve to different scopes.
        let identity = resolver.resolve(Some(&management.api_key)).await.unwrap();
        assert_eq!(
            identity.as_organization().unwrap().scope,
            OrgKeyScope::Management
        );

        let identity = resolver.resolve(Some(&evaluation.api_key)).await.unwrap();
        let resolved = identity.as_organization().unwrap();
        assert_eq!(resolved.scope, OrgKeyScope::Evaluation);
        assert_eq!(resolved.owner, "alice");
    }

    #[tokio::test]
    async fn unknown_org_key_fails() {
        let (_db, resolver, _services) = setup().await;
        let err = resolver
            .resolve(Some("org_does_not_exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrgApiKey));
    }

    #[tokio::test]
    async fn revoked_org_key_fails() {
        let (_db, resolver, services) = setup().await;
        let org = services
            .organizations
            .create(
                CreateOrganization {
                    name: "Acme".to_string(),
                },
                "alice".to_string(),
            )
            .await
            .unwrap();
        let created = services
            .organizations
            .create_key(
                org.id,
                CreateOrgApiKey {
                    name: "ops".to_string(),
                    scope: OrgKeyScope::All,
                },
            )
            .await
            .unwrap();

        services
            .organizations
            .revoke_key(org.id, created.key.id)
            .await
            .unwrap();

        let err = resolver.resolve(Some(&created.api_key)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrgApiKey));
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let (_db, resolver, services) = setup().await;
        let created = services
            .users
            .create(CreateUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap();

        let first = resolver.resolve(Some(&created.api_key)).await.unwrap();
        let second = resolver.resolve(Some(&created.api_key)).await.unwrap();
        let (a, b) = (first.as_user().unwrap(), second.as_user().unwrap());
        assert_eq!(a.user_id, b.user_id);
        assert_eq!(a.username, b.username);
        assert_eq!(a.role, b.role);
    }
}
