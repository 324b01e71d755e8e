use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::SLUG_REGEX;

/// A feature offered by a service. The feature is enabled for a contract
/// when the contract's plan appears in `plans`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Feature {
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_REGEX))]
    pub key: String,
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub description: String,
    /// Plan names that include this feature.
    pub plans: Vec<String>,
}

impl Feature {
    pub fn enabled_for(&self, plan: &str) -> bool {
        self.plans.iter().any(|p| p == plan)
    }
}

/// An entry in the service catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    /// URL-friendly unique name, e.g. `log-retention`.
    pub name: String,
    pub description: String,
    pub features: Vec<Feature>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Plan names referenced by at least one feature, deduplicated in
    /// first-seen order.
    pub fn plans(&self) -> Vec<&str> {
        let mut plans: Vec<&str> = Vec::new();
        for feature in &self.features {
            for plan in &feature.plans {
                if !plans.contains(&plan.as_str()) {
                    plans.push(plan);
                }
            }
        }
        plans
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateService {
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_REGEX))]
    pub name: String,
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub description: String,
    #[validate(nested)]
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateService {
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[validate(nested)]
    pub features: Option<Vec<Feature>>,
}
