use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{Database, DbResult},
    models::{CreateService, Service, UpdateService},
};

/// The service catalog: what the platform offers for contracting.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<Database>,
}

impl CatalogService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateService) -> DbResult<Service> {
        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            features: input.features,
            created_at: now,
            updated_at: now,
        };
        let service = self.db.services().insert(service).await?;
        tracing::info!(service = %service.name, "Added catalog service");
        Ok(service)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Service>> {
        self.db.services().get_by_name(name).await
    }

    pub async fn list(&self) -> DbResult<Vec<Service>> {
        self.db.services().list().await
    }

    pub async fn update(&self, name: &str, input: UpdateService) -> DbResult<Service> {
        self.db.services().update(name, input).await
    }

    pub async fn delete(&self, name: &str) -> DbResult<()> {
        self.db.services().delete(name).await
    }
}
