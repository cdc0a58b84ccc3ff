use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{CreateUserParams, UpdateUserParams, UsersRepo};
use crate::application::validate::{ensure_email, ensure_non_empty};
use crate::domain::entities::UserRecord;
use crate::domain::types::UserRole;

#[derive(Clone)]
pub struct AdminUserService {
    users: Arc<dyn UsersRepo>,
}

impl AdminUserService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<UserRecord>, AppError> {
        Ok(self.users.list_users(page).await?)
    }

    pub async fn load(&self, id: Uuid) -> Result<UserRecord, AppError> {
        self.users.find_user_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        email: String,
        display_name: String,
        role: UserRole,
    ) -> Result<UserRecord, AppError> {
        ensure_email("email", &email)?;
        ensure_non_empty("display_name", &display_name)?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::validation("a user with this email already exists"));
        }

        Ok(self
            .users
            .create_user(CreateUserParams {
                email,
                display_name,
                role,
            })
            .await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        email: String,
        display_name: String,
        role: UserRole,
        active: bool,
    ) -> Result<UserRecord, AppError> {
        ensure_email("email", &email)?;
        ensure_non_empty("display_name", &display_name)?;

        if let Some(existing) = self.users.find_user_by_email(&email).await? {
            if existing.id != id {
                return Err(AppError::validation("a user with this email already exists"));
            }
        }

        Ok(self
            .users
            .update_user(UpdateUserParams {
                id,
                email,
                display_name,
                role,
                active,
            })
            .await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.load(id).await?;
        Ok(self.users.delete_user(id).await?)
    }
}
