use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, TagsRepo};
use crate::domain::entities::TagRecord;

use super::{PostgresRepositories, util::map_sqlx_error};

const TAG_COLUMNS: &str = "id, slug, name, created_at";

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        sqlx::query_as::<_, TagRecord>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY name"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_tag_by_id(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        sqlx::query_as::<_, TagRecord>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        sqlx::query_as::<_, TagRecord>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_tag(&self, slug: String, name: String) -> Result<TagRecord, RepoError> {
        sqlx::query_as::<_, TagRecord>(&format!(
            "INSERT INTO tags (slug, name) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        ))
        .bind(slug)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn rename_tag(
        &self,
        id: Uuid,
        slug: String,
        name: String,
    ) -> Result<TagRecord, RepoError> {
        sqlx::query_as::<_, TagRecord>(&format!(
            "UPDATE tags SET slug = $2, name = $3 WHERE id = $1 RETURNING {TAG_COLUMNS}"
        ))
        .bind(id)
        .bind(slug)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_tag(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
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
