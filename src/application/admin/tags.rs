use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::TagsRepo;
use crate::application::validate::ensure_non_empty;
use crate::cache::{CacheStore, invalidate_prefix, keys};
use crate::domain::entities::TagRecord;
use crate::domain::slug::derive_slug;

#[derive(Clone)]
pub struct AdminTagService {
    tags: Arc<dyn TagsRepo>,
    store: Arc<dyn CacheStore>,
}

impl AdminTagService {
    pub fn new(tags: Arc<dyn TagsRepo>, store: Arc<dyn CacheStore>) -> Self {
        Self { tags, store }
    }

    pub async fn list(&self) -> Result<Vec<TagRecord>, AppError> {
        Ok(self.tags.list_tags().await?)
    }

    pub async fn create(&self, name: String) -> Result<TagRecord, AppError> {
        ensure_non_empty("name", &name)?;
        let slug = derive_slug(&name)
            .map_err(|_| AppError::validation("name cannot be turned into a slug"))?;

        let tag = self.tags.create_tag(slug, name).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(tag)
    }

    pub async fn rename(&self, id: Uuid, name: String) -> Result<TagRecord, AppError> {
        ensure_non_empty("name", &name)?;
        let slug = derive_slug(&name)
            .map_err(|_| AppError::validation("name cannot be turned into a slug"))?;

        let tag = self.tags.rename_tag(id, slug, name).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(tag)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.tags
            .find_tag_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.tags.delete_tag(id).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(())
    }
}
