use async_trait::async_trait;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{CreateUserParams, RepoError, UpdateUserParams, UsersRepo};
use crate::domain::entities::UserRecord;

use super::{PostgresRepositories, util::map_sqlx_error};

const USER_COLUMNS: &str = "id, email, display_name, role, active, created_at, updated_at";

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn list_users(&self, page: PageRequest) -> Result<Page<UserRecord>, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let items = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY email LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (email, display_name, role) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.email)
        .bind(params.display_name)
        .bind(params.role)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET email = $2, display_name = $3, role = $4, active = $5, \
             updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.email)
        .bind(params.display_name)
        .bind(params.role)
        .bind(params.active)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
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
