use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{ContactRepo, CreateContactMessageParams, RepoError};
use crate::domain::entities::ContactMessageRecord;
use crate::domain::types::ContactStatus;

use super::{PostgresRepositories, util::map_sqlx_error};

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, status, created_at, updated_at";

#[async_trait]
impl ContactRepo for PostgresRepositories {
    async fn create_contact_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError> {
        sqlx::query_as::<_, ContactMessageRecord>(&format!(
            "INSERT INTO contact_messages (name, email, subject, message) \
             VALUES ($1, $2, $3, $4) RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.email)
        .bind(params.subject)
        .bind(params.message)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_contact_messages(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<ContactMessageRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM contact_messages WHERE TRUE");
        if let Some(status) = status {
            count_qb.push(" AND status = ");
            count_qb.push_bind(status);
        }
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE TRUE"
        ));
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<ContactMessageRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn find_contact_message_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactMessageRecord>, RepoError> {
        sqlx::query_as::<_, ContactMessageRecord>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactMessageRecord, RepoError> {
        sqlx::query_as::<_, ContactMessageRecord>(&format!(
            "UPDATE contact_messages SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
