use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ServiceRepo,
    },
    models::{Service, UpdateService},
};

#[derive(Default)]
pub struct MemoryServiceRepo {
    services: DashMap<Uuid, Service>,
}

impl MemoryServiceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for_name(&self, name: &str) -> Option<Uuid> {
        self.services
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.id)
    }
}

#[async_trait]
impl ServiceRepo for MemoryServiceRepo {
    async fn insert(&self, service: Service) -> DbResult<Service> {
        if self.id_for_name(&service.name).is_some() {
            return Err(DbError::Conflict(format!(
                "Service '{}' already exists",
                service.name
            )));
        }
        self.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn get_by_name(&self, name: &str) -> DbResult<Option<Service>> {
        Ok(self
            .services
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.clone()))
    }

    async fn list(&self) -> DbResult<Vec<Service>> {
        let mut services: Vec<Service> = self.services.iter().map(|s| s.clone()).collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn update(&self, name: &str, input: UpdateService) -> DbResult<Service> {
        let id = self.id_for_name(name).ok_or(DbError::NotFound)?;
        let mut service = self.services.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(description) = input.description {
            service.description = description;
        }
        if let Some(features) = input.features {
            service.features = features;
        }
        service.updated_at = Utc::now();
        Ok(service.clone())
    }

    async fn delete(&self, name: &str) -> DbResult<()> {
        let id = self.id_for_name(name).ok_or(DbError::NotFound)?;
        self.services.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            features: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn name_is_unique() {
        let repo = MemoryServiceRepo::new();
        repo.insert(service("metrics")).await.unwrap();
        assert!(matches!(
            repo.insert(service("metrics")).await,
            Err(DbError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let repo = MemoryServiceRepo::new();
        repo.insert(service("zeta")).await.unwrap();
        repo.insert(service("alpha")).await.unwrap();
        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
