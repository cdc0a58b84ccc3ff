use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{CreateNotificationParams, NotificationsRepo, RepoError};
use crate::domain::entities::NotificationRecord;

use super::{PostgresRepositories, util::map_sqlx_error};

// `read` is a reserved word in Postgres.
const NOTIFICATION_COLUMNS: &str = "id, kind, subject_id, summary, \"read\", created_at";

#[async_trait]
impl NotificationsRepo for PostgresRepositories {
    async fn insert_notification(
        &self,
        params: CreateNotificationParams,
    ) -> Result<NotificationRecord, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "INSERT INTO notifications (kind, subject_id, summary) VALUES ($1, $2, $3) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(params.kind)
        .bind(params.subject_id)
        .bind(params.summary)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_notifications(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM notifications WHERE TRUE");
        if unread_only {
            count_qb.push(" AND NOT \"read\"");
        }
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE TRUE"
        ));
        if unread_only {
            qb.push(" AND NOT \"read\"");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<NotificationRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRecord, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "UPDATE notifications SET \"read\" = TRUE WHERE id = $1 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
