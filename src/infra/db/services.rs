use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    CreateServiceParams, RepoError, ServicesRepo, UpdateServiceParams,
};
use crate::domain::entities::ServiceRecord;

use super::{PostgresRepositories, util::map_sqlx_error};

// `position` is a reserved word in Postgres.
const SERVICE_COLUMNS: &str = "id, slug, title, summary, body_markdown, body_html, \
     \"position\", published, created_at, updated_at";

#[async_trait]
impl ServicesRepo for PostgresRepositories {
    async fn list_services(
        &self,
        published_only: bool,
    ) -> Result<Vec<ServiceRecord>, RepoError> {
        let sql = if published_only {
            format!(
                "SELECT {SERVICE_COLUMNS} FROM services WHERE published ORDER BY \"position\", title"
            )
        } else {
            format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY \"position\", title")
        };
        sqlx::query_as::<_, ServiceRecord>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_service_by_id(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError> {
        sqlx::query_as::<_, ServiceRecord>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_service_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ServiceRecord>, RepoError> {
        sqlx::query_as::<_, ServiceRecord>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_service(
        &self,
        params: CreateServiceParams,
    ) -> Result<ServiceRecord, RepoError> {
        sqlx::query_as::<_, ServiceRecord>(&format!(
            "INSERT INTO services (slug, title, summary, body_markdown, body_html, \"position\", published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(params.slug)
        .bind(params.title)
        .bind(params.summary)
        .bind(params.body_markdown)
        .bind(params.body_html)
        .bind(params.position)
        .bind(params.published)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_service(
        &self,
        params: UpdateServiceParams,
    ) -> Result<ServiceRecord, RepoError> {
        sqlx::query_as::<_, ServiceRecord>(&format!(
            "UPDATE services SET slug = $2, title = $3, summary = $4, body_markdown = $5, \
             body_html = $6, published = $7, updated_at = now() \
             WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.slug)
        .bind(params.title)
        .bind(params.summary)
        .bind(params.body_markdown)
        .bind(params.body_html)
        .bind(params.published)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn reorder_services(&self, ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        for (position, id) in ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE services SET \"position\" = $2, updated_at = now() WHERE id = $1",
            )
            .bind(id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            if result.rows_affected() == 0 {
                return Err(RepoError::InvalidInput {
                    message: format!("unknown service id {id}"),
                });
            }
        }

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
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
