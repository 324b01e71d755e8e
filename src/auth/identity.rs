use uuid::Uuid;

use crate::models::{OrgKeyScope, OrgMember, UserRole};

/// A human user resolved from a `usr_` API key.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

/// An organization resolved from an `org_` API key. The scope comes from the
/// specific key that matched, not from the organization as a whole.
#[derive(Debug, Clone)]
pub struct OrganizationIdentity {
    pub organization_id: Uuid,
    pub name: String,
    pub scope: OrgKeyScope,
    pub owner: String,
    pub members: Vec<OrgMember>,
}

/// The caller of one request. Built fresh by the credential resolver,
/// attached as a request extension, and discarded with the request.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    User(UserIdentity),
    Organization(OrganizationIdentity),
}

impl Identity {
    #[allow(dead_code)] // Used in tests
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn as_user(&self) -> Option<&UserIdentity> {
        match self {
            Identity::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_organization(&self) -> Option<&OrganizationIdentity> {
        match self {
            Identity::Organization(org) => Some(org),
            _ => None,
        }
    }

    /// Whether the caller is a platform admin (user credential with the
    /// admin role).
    pub fn is_platform_admin(&self) -> bool {
        matches!(self, Identity::User(user) if user.role == UserRole::Admin)
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Anonymous => "anonymous",
            Identity::User(_) => "user",
            Identity::Organization(_) => "organization",
        }
    }
}
