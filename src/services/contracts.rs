use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{Database, DbError, DbResult},
    models::{Contract, ContractStatus, CreateContract},
};

/// Contracts binding organizations to catalog services.
#[derive(Clone)]
pub struct ContractService {
    db: Arc<Database>,
}

impl ContractService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a contract. The organization and service must exist, the plan
    /// must be one the service actually offers, and at most one active
    /// contract may bind an organization to a service.
    pub async fn create(&self, input: CreateContract) -> DbResult<Contract> {
        let org = self
            .db
            .organizations()
            .get_by_id(input.organization_id)
            .await?
            .ok_or(DbError::NotFound)?;
        let service = self
            .db
            .services()
            .get_by_name(&input.service)
            .await?
            .ok_or(DbError::NotFound)?;

        if !service.plans().contains(&input.plan.as_str()) {
            return Err(DbError::Validation(format!(
                "Service '{}' has no plan '{}'",
                service.name, input.plan
            )));
        }
        if self
            .db
            .contracts()
            .active_for(org.id, service.id)
            .await?
            .is_some()
        {
            return Err(DbError::Conflict(format!(
                "Organization already has an active contract for '{}'",
                service.name
            )));
        }

        let contract = Contract {
            id: Uuid::new_v4(),
            organization_id: org.id,
            service_id: service.id,
            plan: input.plan,
            status: ContractStatus::Active,
            created_at: Utc::now(),
            terminated_at: None,
        };
        let contract = self.db.contracts().insert(contract).await?;
        tracing::info!(
            organization = %org.name,
            service = %service.name,
            plan = %contract.plan,
            "Created contract"
        );
        Ok(contract)
    }

    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Contract>> {
        self.db.contracts().get_by_id(id).await
    }

    pub async fn list(&self) -> DbResult<Vec<Contract>> {
        self.db.contracts().list().await
    }

    pub async fn list_for_organization(&self, organization_id: Uuid) -> DbResult<Vec<Contract>> {
        self.db.contracts().list_for_organization(organization_id).await
    }

    pub async fn terminate(&self, id: Uuid) -> DbResult<Contract> {
        let contract = self.db.contracts().terminate(id).await?;
        tracing::info!(contract_id = %contract.id, "Terminated contract");
        Ok(contract)
    }
}
