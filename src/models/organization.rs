use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::USERNAME_REGEX;

/// Role held by a user *within* one organization, distinct from the user's
/// platform-wide role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgUserRole {
    /// Derived from `Organization::owner`, never stored in the members list.
    Owner,
    Admin,
    Manager,
    Evaluator,
}

impl OrgUserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgUserRole::Owner => "owner",
            OrgUserRole::Admin => "admin",
            OrgUserRole::Manager => "manager",
            OrgUserRole::Evaluator => "evaluator",
        }
    }
}

impl fmt::Display for OrgUserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrgUserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(OrgUserRole::Owner),
            "admin" => Ok(OrgUserRole::Admin),
            "manager" => Ok(OrgUserRole::Manager),
            "evaluator" => Ok(OrgUserRole::Evaluator),
            _ => Err(format!(
                "Invalid organization role '{}'. Valid roles: owner, admin, manager, evaluator",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMember {
    pub username: String,
    pub role: OrgUserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// Username of the owning user. The owner is implicitly `OrgUserRole::Owner`
    /// and does not appear in `members`.
    pub owner: String,
    pub members: Vec<OrgMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Stored membership role for a username. The owner is not covered here;
    /// ownership is resolved before membership.
    pub fn member_role(&self, username: &str) -> Option<OrgUserRole> {
        self.members
            .iter()
            .find(|m| m.username == username)
            .map(|m| m.role)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddOrgMember {
    #[validate(length(min = 1, max = 64), regex(path = *USERNAME_REGEX))]
    pub username: String,
    pub role: OrgUserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrgMember {
    pub role: OrgUserRole,
}
