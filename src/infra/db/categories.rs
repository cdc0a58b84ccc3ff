use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoryWithCount, CreateCategoryParams, RepoError, UpdateCategoryParams,
};
use crate::domain::entities::CategoryRecord;
use crate::domain::types::PostStatus;

use super::{PostgresRepositories, util::map_sqlx_error};

const CATEGORY_COLUMNS: &str = "id, slug, name, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CategoryCountRow {
    #[sqlx(flatten)]
    category: CategoryRecord,
    post_count: i64,
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_category_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            "SELECT c.id, c.slug, c.name, c.description, c.created_at, c.updated_at, \
             COUNT(p.id) FILTER (WHERE p.status = $1 AND p.published_at IS NOT NULL) AS post_count \
             FROM categories c \
             LEFT JOIN posts p ON p.category_id = c.id \
             GROUP BY c.id ORDER BY c.name",
        )
        .bind(PostStatus::Published)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(CategoryWithCount {
                    category: row.category,
                    post_count: Self::convert_count(row.post_count)?,
                })
            })
            .collect()
    }

    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(&format!(
            "INSERT INTO categories (slug, name, description) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(params.slug)
        .bind(params.name)
        .bind(params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        sqlx::query_as::<_, CategoryRecord>(&format!(
            "UPDATE categories SET slug = $2, name = $3, description = $4, updated_at = now() \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.slug)
        .bind(params.name)
        .bind(params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
