use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::render::render_markdown;
use crate::application::repos::{CreateServiceParams, ServicesRepo, UpdateServiceParams};
use crate::application::validate::ensure_non_empty;
use crate::cache::{CacheStore, invalidate_prefix, keys};
use crate::domain::entities::ServiceRecord;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug};

#[derive(Debug, Clone)]
pub struct UpsertServiceCommand {
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub published: bool,
}

/// Practice-area management. Writes invalidate the `services:` cache family.
#[derive(Clone)]
pub struct AdminServiceService {
    services: Arc<dyn ServicesRepo>,
    store: Arc<dyn CacheStore>,
}

impl AdminServiceService {
    pub fn new(services: Arc<dyn ServicesRepo>, store: Arc<dyn CacheStore>) -> Self {
        Self { services, store }
    }

    pub async fn list(&self) -> Result<Vec<ServiceRecord>, AppError> {
        Ok(self.services.list_services(false).await?)
    }

    pub async fn load(&self, id: Uuid) -> Result<ServiceRecord, AppError> {
        self.services
            .find_service_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, command: UpsertServiceCommand) -> Result<ServiceRecord, AppError> {
        ensure_non_empty("title", &command.title)?;
        ensure_non_empty("body_markdown", &command.body_markdown)?;

        let slug = self.derive_unique_slug(&command.title).await?;
        let body_html = render_markdown(&command.body_markdown);

        // New entries go to the end of the ordering.
        let position = self.services.list_services(false).await?.len() as i32;

        let service = self
            .services
            .create_service(CreateServiceParams {
                slug,
                title: command.title,
                summary: command.summary,
                body_markdown: command.body_markdown,
                body_html,
                position,
                published: command.published,
            })
            .await?;

        invalidate_prefix(self.store.as_ref(), keys::SERVICES_PREFIX).await;
        Ok(service)
    }

    pub async fn update(
        &self,
        id: Uuid,
        slug: String,
        command: UpsertServiceCommand,
    ) -> Result<ServiceRecord, AppError> {
        ensure_non_empty("slug", &slug)?;
        ensure_non_empty("title", &command.title)?;
        ensure_non_empty("body_markdown", &command.body_markdown)?;

        let body_html = render_markdown(&command.body_markdown);
        let service = self
            .services
            .update_service(UpdateServiceParams {
                id,
                slug,
                title: command.title,
                summary: command.summary,
                body_markdown: command.body_markdown,
                body_html,
                published: command.published,
            })
            .await?;

        invalidate_prefix(self.store.as_ref(), keys::SERVICES_PREFIX).await;
        Ok(service)
    }

    pub async fn reorder(&self, ids: Vec<Uuid>) -> Result<(), AppError> {
        if ids.is_empty() {
            return Err(AppError::validation("ordering must name at least one service"));
        }
        self.services.reorder_services(&ids).await?;
        invalidate_prefix(self.store.as_ref(), keys::SERVICES_PREFIX).await;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.load(id).await?;
        self.services.delete_service(id).await?;
        invalidate_prefix(self.store.as_ref(), keys::SERVICES_PREFIX).await;
        Ok(())
    }

    async fn derive_unique_slug(&self, title: &str) -> Result<String, AppError> {
        let services = self.services.clone();
        generate_unique_slug(title, move |candidate| {
            let services = services.clone();
            let candidate = candidate.to_string();
            async move {
                services
                    .find_service_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. }) => {
                AppError::validation("title cannot be turned into a slug")
            }
            SlugAsyncError::Slug(SlugError::Exhausted { base }) => {
                AppError::validation(format!("no free slug variant for `{base}`"))
            }
            SlugAsyncError::Predicate(repo) => AppError::from(repo),
        })
    }
}
