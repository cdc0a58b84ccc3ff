use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::NotificationsRepo;
use crate::domain::entities::NotificationRecord;

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationsRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self { notifications }
    }

    pub async fn list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationRecord>, AppError> {
        Ok(self.notifications.list_notifications(unread_only, page).await?)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<NotificationRecord, AppError> {
        Ok(self.notifications.mark_notification_read(id).await?)
    }
}
