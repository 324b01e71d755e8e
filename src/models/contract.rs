use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Binds an organization to a catalog service under one pricing plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub plan: String,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
    pub terminated_at: Option<DateTime<Utc>>,
}

impl Contract {
    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContract {
    pub organization_id: Uuid,
    /// Catalog name of the service being contracted.
    #[validate(length(min = 1, max = 64))]
    pub service: String,
    #[validate(length(min = 1, max = 64))]
    pub plan: String,
}
