//! Service Handler

use std::sync::Arc;

use crate::domain::{Service, ServiceDraft};
use crate::error::AppError;
use crate::store::TimeBankStore;

/// Handler for service listings
pub struct ServiceHandler {
    store: Arc<dyn TimeBankStore>,
}

impl ServiceHandler {
    pub fn new(store: Arc<dyn TimeBankStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: ServiceDraft) -> Result<Service, AppError> {
        let service = self.store.create_service(draft).await?;

        tracing::info!(
            service_id = service.id,
            provider_user_id = service.provider_user_id,
            "Service listed"
        );
        Ok(service)
    }

    pub async fn list(&self) -> Result<Vec<Service>, AppError> {
        Ok(self.store.list_services().await?)
    }
}
