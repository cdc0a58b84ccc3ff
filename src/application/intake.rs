//! Public intake: appointment requests and contact messages.
//!
//! The row insert is the operation the visitor waits on; the back-office
//! notification is an explicit best-effort task whose failure is logged and
//! never fails the submission.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    AppointmentsRepo, ContactRepo, CreateAppointmentParams, CreateContactMessageParams,
    CreateNotificationParams, NotificationsRepo, ServicesRepo,
};
use crate::application::validate::{ensure_email, ensure_max_len, ensure_non_empty};
use crate::domain::entities::{AppointmentRecord, ContactMessageRecord};

const MAX_MESSAGE_LEN: usize = 10_000;

#[derive(Debug, Clone)]
pub struct SubmitAppointmentCommand {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_slug: Option<String>,
    pub preferred_at: Option<OffsetDateTime>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SubmitContactCommand {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Clone)]
pub struct IntakeService {
    appointments: Arc<dyn AppointmentsRepo>,
    contact: Arc<dyn ContactRepo>,
    services: Arc<dyn ServicesRepo>,
    notifications: Arc<dyn NotificationsRepo>,
}

impl IntakeService {
    pub fn new(
        appointments: Arc<dyn AppointmentsRepo>,
        contact: Arc<dyn ContactRepo>,
        services: Arc<dyn ServicesRepo>,
        notifications: Arc<dyn NotificationsRepo>,
    ) -> Self {
        Self {
            appointments,
            contact,
            services,
            notifications,
        }
    }

    pub async fn submit_appointment(
        &self,
        command: SubmitAppointmentCommand,
    ) -> Result<AppointmentRecord, AppError> {
        ensure_non_empty("name", &command.name)?;
        ensure_email("email", &command.email)?;
        ensure_max_len("message", &command.message, MAX_MESSAGE_LEN)?;

        // A stale or unknown practice-area slug invalidates the submission
        // rather than silently dropping the association.
        let service_id = match command.service_slug.as_deref() {
            Some(slug) => Some(
                self.services
                    .find_service_by_slug(slug)
                    .await?
                    .ok_or_else(|| {
                        AppError::validation(format!("unknown practice area `{slug}`"))
                    })?
                    .id,
            ),
            None => None,
        };

        let appointment = self
            .appointments
            .create_appointment(CreateAppointmentParams {
                name: command.name.trim().to_string(),
                email: command.email.trim().to_string(),
                phone: command.phone.trim().to_string(),
                service_id,
                preferred_at: command.preferred_at,
                message: command.message.trim().to_string(),
            })
            .await?;

        self.notify(
            "appointment.created",
            appointment.id,
            format!("Appointment request from {}", appointment.name),
        );

        Ok(appointment)
    }

    pub async fn submit_contact(
        &self,
        command: SubmitContactCommand,
    ) -> Result<ContactMessageRecord, AppError> {
        ensure_non_empty("name", &command.name)?;
        ensure_email("email", &command.email)?;
        ensure_non_empty("message", &command.message)?;
        ensure_max_len("message", &command.message, MAX_MESSAGE_LEN)?;

        let message = self
            .contact
            .create_contact_message(CreateContactMessageParams {
                name: command.name.trim().to_string(),
                email: command.email.trim().to_string(),
                subject: command.subject.trim().to_string(),
                message: command.message.trim().to_string(),
            })
            .await?;

        self.notify(
            "contact.created",
            message.id,
            format!("Contact message from {}", message.name),
        );

        Ok(message)
    }

    fn notify(&self, kind: &'static str, subject_id: Uuid, summary: String) {
        let notifications = self.notifications.clone();
        tokio::spawn(async move {
            let params = CreateNotificationParams {
                kind: kind.to_string(),
                subject_id: Some(subject_id),
                summary,
            };
            if let Err(err) = notifications.insert_notification(params).await {
                warn!(
                    target = "praxis::intake",
                    kind,
                    subject_id = %subject_id,
                    error = %err,
                    "notification insert failed"
                );
            }
        });
    }
}
