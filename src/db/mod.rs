//! Persistence seam: repository traits plus the bundled in-memory binding.

pub mod error;
pub mod memory;
pub mod repos;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::{ContractRepo, OrgKeyMatch, OrganizationRepo, ServiceRepo, UserRepo};

use memory::{MemoryContractRepo, MemoryOrganizationRepo, MemoryServiceRepo, MemoryUserRepo};

/// Container handing out the repositories. The core consumes persistence
/// only through these trait objects.
pub struct Database {
    users: Arc<dyn UserRepo>,
    organizations: Arc<dyn OrganizationRepo>,
    services: Arc<dyn ServiceRepo>,
    contracts: Arc<dyn ContractRepo>,
}

impl Database {
    pub fn new(
        users: Arc<dyn UserRepo>,
        organizations: Arc<dyn OrganizationRepo>,
        services: Arc<dyn ServiceRepo>,
        contracts: Arc<dyn ContractRepo>,
    ) -> Self {
        Self {
            users,
            organizations,
            services,
            contracts,
        }
    }

    /// The in-memory binding used by the dev server and tests.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryUserRepo::new()),
            Arc::new(MemoryOrganizationRepo::new()),
            Arc::new(MemoryServiceRepo::new()),
            Arc::new(MemoryContractRepo::new()),
        )
    }

    pub fn users(&self) -> &dyn UserRepo {
        self.users.as_ref()
    }

    pub fn organizations(&self) -> &dyn OrganizationRepo {
        self.organizations.as_ref()
    }

    pub fn services(&self) -> &dyn ServiceRepo {
        self.services.as_ref()
    }

    pub fn contracts(&self) -> &dyn ContractRepo {
        self.contracts.as_ref()
    }
}
