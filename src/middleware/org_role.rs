//! Organization-role checks for organization-scoped routes.
//!
//! A two-step pipeline: `OrgRoleResolver::resolve` turns (identity, org id)
//! into an `OrgAccess`, then each route applies its own allow-list via
//! `OrgAccess::require`. The split exists because several routes share one
//! resolved role but apply different allow-lists.
//!
//! Organization-key callers never reach this layer; their authorization was
//! fully decided by the permission table via key scope.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    auth::{AuthError, Identity},
    db::Database,
    models::{OrgUserRole, UserRole},
};

/// The caller's standing within one organization.
#[derive(Debug, Clone)]
pub struct OrgAccess {
    /// Resolved role: owner, or the stored membership role. Stays `None`
    /// for a platform admin without membership.
    role: Option<OrgUserRole>,
    /// Platform-admin override. Kept as its own flag (not folded into
    /// `role`) so the privilege escalation stays visible and testable.
    platform_admin: bool,
}

impl OrgAccess {
    /// The resolved role, for routes that branch on it rather than gate.
    #[allow(dead_code)]
    pub fn role(&self) -> Option<OrgUserRole> {
        self.role
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_platform_admin(&self) -> bool {
        self.platform_admin
    }

    /// Check the resolved role against a route's allow-list. Platform
    /// admins pass regardless of membership.
    pub fn require(&self, allowed: &[OrgUserRole]) -> Result<(), AuthError> {
        if self.platform_admin {
            tracing::debug!("Platform admin override on organization role check");
            return Ok(());
        }
        match self.role {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => Err(AuthError::InsufficientOrgRole),
        }
    }
}

#[derive(Clone)]
pub struct OrgRoleResolver {
    db: Arc<Database>,
}

impl OrgRoleResolver {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve the caller's role within `organization_id`.
    ///
    /// Ownership wins over stored membership; a platform admin without
    /// either passes with no resolved role; everyone else is rejected as
    /// `NotAMember`. A nonexistent organization is 404, distinct from any
    /// permission denial.
    pub async fn resolve(
        &self,
        identity: &Identity,
        organization_id: Uuid,
    ) -> Result<OrgAccess, AuthError> {
        let Identity::User(user) = identity else {
            return Err(AuthError::NotAMember);
        };

        let org = self
            .db
            .organizations()
            .get_by_id(organization_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::OrganizationNotFound)?;

        let platform_admin = user.role == UserRole::Admin;

        if org.owner == user.username {
            return Ok(OrgAccess {
                role: Some(OrgUserRole::Owner),
                platform_admin,
            });
        }
        if let Some(role) = org.member_role(&user.username) {
            return Ok(OrgAccess {
                role: Some(role),
                platform_admin,
            });
        }
        if platform_admin {
            tracing::debug!(
                username = %user.username,
                organization_id = %organization_id,
                "Platform admin accessing organization without membership"
            );
            return Ok(OrgAccess {
                role: None,
                platform_admin: true,
            });
        }

        Err(AuthError::NotAMember)
    }
}
