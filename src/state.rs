use std::sync::Arc;

use crate::{
    auth::CredentialResolver,
    authz::AuthzEngine,
    config::{ConfigError, PorticoConfig},
    db::Database,
    middleware::OrgRoleResolver,
    services::Services,
};

/// Shared application state. Cheap to clone; everything mutable lives
/// behind the repositories.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PorticoConfig>,
    pub db: Arc<Database>,
    pub services: Services,
    pub resolver: CredentialResolver,
    pub authz: AuthzEngine,
    pub org_roles: OrgRoleResolver,
}

impl AppState {
    /// State over the bundled in-memory repositories.
    pub fn new(config: PorticoConfig) -> Result<Self, ConfigError> {
        Self::with_database(config, Arc::new(Database::in_memory()))
    }

    /// State over caller-provided repositories.
    pub fn with_database(
        config: PorticoConfig,
        db: Arc<Database>,
    ) -> Result<Self, ConfigError> {
        let table = Arc::new(config.permission_table()?);
        let services = Services::new(db.clone(), &config.auth);
        let resolver = CredentialResolver::new(db.clone(), &config.auth);
        let org_roles = OrgRoleResolver::new(db.clone());
        Ok(Self {
            config: Arc::new(config),
            db,
            services,
            resolver,
            authz: AuthzEngine::new(table),
            org_roles,
        })
    }
}
