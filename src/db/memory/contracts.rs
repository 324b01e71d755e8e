use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ContractRepo,
    },
    models::{Contract, ContractStatus},
};

#[derive(Default)]
pub struct MemoryContractRepo {
    contracts: DashMap<Uuid, Contract>,
}

impl MemoryContractRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractRepo for MemoryContractRepo {
    async fn insert(&self, contract: Contract) -> DbResult<Contract> {
        self.contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Contract>> {
        Ok(self.contracts.get(&id).map(|c| c.clone()))
    }

    async fn list(&self) -> DbResult<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self.contracts.iter().map(|c| c.clone()).collect();
        contracts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(contracts)
    }

    async fn list_for_organization(&self, organization_id: Uuid) -> DbResult<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self
            .contracts
            .iter()
            .filter(|c| c.organization_id == organization_id)
            .map(|c| c.clone())
            .collect();
        contracts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(contracts)
    }

    async fn active_for(
        &self,
        organization_id: Uuid,
        service_id: Uuid,
    ) -> DbResult<Option<Contract>> {
        Ok(self
            .contracts
            .iter()
            .find(|c| {
                c.organization_id == organization_id
                    && c.service_id == service_id
                    && c.is_active()
            })
            .map(|c| c.clone()))
    }

    async fn terminate(&self, id: Uuid) -> DbResult<Contract> {
        let mut contract = self.contracts.get_mut(&id).ok_or(DbError::NotFound)?;
        if contract.status == ContractStatus::Terminated {
            return Err(DbError::Conflict(
                "Contract is already terminated".to_string(),
            ));
        }
        contract.status = ContractStatus::Terminated;
        contract.terminated_at = Some(Utc::now());
        Ok(contract.clone())
    }
}
