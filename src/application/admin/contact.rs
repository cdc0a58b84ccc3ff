use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::ContactRepo;
use crate::domain::entities::ContactMessageRecord;
use crate::domain::types::ContactStatus;

#[derive(Clone)]
pub struct AdminContactService {
    contact: Arc<dyn ContactRepo>,
}

impl AdminContactService {
    pub fn new(contact: Arc<dyn ContactRepo>) -> Self {
        Self { contact }
    }

    pub async fn list(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<ContactMessageRecord>, AppError> {
        Ok(self.contact.list_contact_messages(status, page).await?)
    }

    pub async fn load(&self, id: Uuid) -> Result<ContactMessageRecord, AppError> {
        self.contact
            .find_contact_message_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactMessageRecord, AppError> {
        Ok(self.contact.update_contact_status(id, status).await?)
    }
}
