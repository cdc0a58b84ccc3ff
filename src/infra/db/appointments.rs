use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    AppointmentMeta, AppointmentsRepo, CreateAppointmentParams, RepoError,
};
use crate::domain::entities::AppointmentRecord;
use crate::domain::types::AppointmentStatus;

use super::{PostgresRepositories, util::map_sqlx_error};

const APPOINTMENT_COLUMNS: &str = "id, name, email, phone, service_id, preferred_at, message, \
     status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AppointmentMetaRow {
    status: AppointmentStatus,
    created_at: OffsetDateTime,
}

#[async_trait]
impl AppointmentsRepo for PostgresRepositories {
    async fn create_appointment(
        &self,
        params: CreateAppointmentParams,
    ) -> Result<AppointmentRecord, RepoError> {
        sqlx::query_as::<_, AppointmentRecord>(&format!(
            "INSERT INTO appointments (name, email, phone, service_id, preferred_at, message) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.email)
        .bind(params.phone)
        .bind(params.service_id)
        .bind(params.preferred_at)
        .bind(params.message)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
        page: PageRequest,
    ) -> Result<Page<AppointmentRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM appointments WHERE TRUE");
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
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE TRUE"
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
            .build_query_as::<AppointmentRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn find_appointment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AppointmentRecord>, RepoError> {
        sqlx::query_as::<_, AppointmentRecord>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, RepoError> {
        sqlx::query_as::<_, AppointmentRecord>(&format!(
            "UPDATE appointments SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_appointment_meta(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<AppointmentMeta>, RepoError> {
        let rows = sqlx::query_as::<_, AppointmentMetaRow>(
            "SELECT status, created_at FROM appointments \
             WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AppointmentMeta {
                status: row.status,
                created_at: row.created_at,
            })
            .collect())
    }
}
