use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Capability scope carried by an organization API key.
///
/// An organization may hold several keys with different scopes; the scope of
/// the key presented on a request is authoritative for that request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgKeyScope {
    /// Everything an organization key can do.
    All,
    /// Contract and catalog management operations.
    Management,
    /// Read-only feature evaluation.
    Evaluation,
}

impl OrgKeyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgKeyScope::All => "all",
            OrgKeyScope::Management => "management",
            OrgKeyScope::Evaluation => "evaluation",
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn all_values() -> &'static [OrgKeyScope] {
        &[
            OrgKeyScope::All,
            OrgKeyScope::Management,
            OrgKeyScope::Evaluation,
        ]
    }
}

impl fmt::Display for OrgKeyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrgKeyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(OrgKeyScope::All),
            "management" => Ok(OrgKeyScope::Management),
            "evaluation" => Ok(OrgKeyScope::Evaluation),
            _ => Err(format!(
                "Invalid scope '{}'. Valid scopes: all, management, evaluation",
                s
            )),
        }
    }
}

/// An API key issued to an organization. The raw key is never stored; the
/// repository holds its SHA-256 hash alongside this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgApiKey {
    pub id: Uuid,
    pub name: String,
    /// First characters of the key, for identification without exposing it.
    pub key_prefix: String,
    pub scope: OrgKeyScope,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl OrgApiKey {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrgApiKey {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub scope: OrgKeyScope,
}

/// Returned on creation only (contains the raw key).
#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrgApiKey {
    #[serde(flatten)]
    pub key: OrgApiKey,
    /// The raw API key (only shown once at creation).
    pub api_key: String,
}
