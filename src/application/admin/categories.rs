use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    CategoriesRepo, CreateCategoryParams, UpdateCategoryParams,
};
use crate::application::validate::ensure_non_empty;
use crate::cache::{CacheStore, invalidate_prefix, keys};
use crate::domain::entities::CategoryRecord;
use crate::domain::slug::derive_slug;

#[derive(Clone)]
pub struct AdminCategoryService {
    categories: Arc<dyn CategoriesRepo>,
    store: Arc<dyn CacheStore>,
}

impl AdminCategoryService {
    pub fn new(categories: Arc<dyn CategoriesRepo>, store: Arc<dyn CacheStore>) -> Self {
        Self { categories, store }
    }

    pub async fn list(&self) -> Result<Vec<CategoryRecord>, AppError> {
        Ok(self.categories.list_categories().await?)
    }

    pub async fn create(
        &self,
        name: String,
        description: String,
    ) -> Result<CategoryRecord, AppError> {
        ensure_non_empty("name", &name)?;
        let slug = derive_slug(&name)
            .map_err(|_| AppError::validation("name cannot be turned into a slug"))?;

        let category = self
            .categories
            .create_category(CreateCategoryParams {
                slug,
                name,
                description,
            })
            .await?;

        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(category)
    }

    pub async fn update(
        &self,
        id: Uuid,
        slug: String,
        name: String,
        description: String,
    ) -> Result<CategoryRecord, AppError> {
        ensure_non_empty("slug", &slug)?;
        ensure_non_empty("name", &name)?;

        let category = self
            .categories
            .update_category(UpdateCategoryParams {
                id,
                slug,
                name,
                description,
            })
            .await?;

        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.categories
            .find_category_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.categories.delete_category(id).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(())
    }
}
