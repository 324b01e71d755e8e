//! Thin service layer between route handlers and the repositories.

mod catalog;
mod contracts;
mod evaluation;
mod organizations;
mod users;

use std::sync::Arc;

pub use catalog::CatalogService;
pub use contracts::ContractService;
pub use evaluation::{EvaluatedFeature, EvaluationService, FeatureEvaluation};
pub use organizations::OrganizationService;
pub use users::UserService;

use crate::{config::AuthConfig, db::Database};

/// Container for all services.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub organizations: OrganizationService,
    pub catalog: CatalogService,
    pub contracts: ContractService,
    pub evaluation: EvaluationService,
}

impl Services {
    pub fn new(db: Arc<Database>, auth: &AuthConfig) -> Self {
        Self {
            users: UserService::new(db.clone(), auth.user_key_prefix.clone()),
            organizations: OrganizationService::new(db.clone(), auth.org_key_prefix.clone()),
            catalog: CatalogService::new(db.clone()),
            contracts: ContractService::new(db.clone()),
            evaluation: EvaluationService::new(db),
        }
    }
}
