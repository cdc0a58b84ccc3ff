use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::AppointmentsRepo;
use crate::domain::entities::AppointmentRecord;
use crate::domain::types::AppointmentStatus;

#[derive(Clone)]
pub struct AdminAppointmentService {
    appointments: Arc<dyn AppointmentsRepo>,
}

impl AdminAppointmentService {
    pub fn new(appointments: Arc<dyn AppointmentsRepo>) -> Self {
        Self { appointments }
    }

    pub async fn list(
        &self,
        status: Option<AppointmentStatus>,
        page: PageRequest,
    ) -> Result<Page<AppointmentRecord>, AppError> {
        Ok(self.appointments.list_appointments(status, page).await?)
    }

    pub async fn load(&self, id: Uuid) -> Result<AppointmentRecord, AppError> {
        self.appointments
            .find_appointment_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, AppError> {
        Ok(self
            .appointments
            .update_appointment_status(id, status)
            .await?)
    }
}
