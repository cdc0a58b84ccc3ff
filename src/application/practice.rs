//! Public practice-area read path, memoized under the `services:` family.

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::AppError;
use crate::application::repos::ServicesRepo;
use crate::cache::{CacheStore, cached_fetch, keys};
use crate::domain::entities::ServiceRecord;

#[derive(Clone)]
pub struct PracticeService {
    services: Arc<dyn ServicesRepo>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl PracticeService {
    pub fn new(services: Arc<dyn ServicesRepo>, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            services,
            store,
            ttl,
        }
    }

    /// Published practice areas in manual order.
    pub async fn list(&self) -> Result<Vec<ServiceRecord>, AppError> {
        let services = self.services.clone();
        cached_fetch(
            self.store.as_ref(),
            &keys::service_list_key(),
            self.ttl,
            move || async move { services.list_services(true).await.map_err(AppError::from) },
        )
        .await
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Option<ServiceRecord>, AppError> {
        let services = self.services.clone();
        let slug_owned = slug.to_string();
        let record: Option<ServiceRecord> = cached_fetch(
            self.store.as_ref(),
            &keys::service_key(slug),
            self.ttl,
            move || async move {
                services
                    .find_service_by_slug(&slug_owned)
                    .await
                    .map_err(AppError::from)
            },
        )
        .await?;

        // Unpublished practice areas exist only for the back office.
        Ok(record.filter(|service| service.published))
    }
}
