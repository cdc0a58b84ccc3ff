use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::{AppError, ErrorReport};
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const VALIDATION: &str = "validation_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }
}

/// Map an application error into the JSON error envelope. The hint carries
/// the error's own message; internals stay behind the generic message.
pub fn app_to_api(err: AppError) -> ApiError {
    let status = err.status_code();
    let (code, message) = match &err {
        AppError::NotFound | AppError::Domain(DomainError::NotFound { .. }) => {
            (codes::NOT_FOUND, "Resource not found")
        }
        AppError::Repo(RepoError::NotFound) => (codes::NOT_FOUND, "Resource not found"),
        AppError::Validation(_) | AppError::Domain(DomainError::Validation { .. }) => {
            (codes::VALIDATION, "Validation failed")
        }
        AppError::Repo(RepoError::InvalidInput { .. }) => {
            (codes::INVALID_INPUT, "Invalid input")
        }
        AppError::Repo(RepoError::Duplicate { .. }) => (codes::DUPLICATE, "Duplicate record"),
        AppError::Repo(RepoError::Integrity { .. }) => {
            (codes::INTEGRITY, "Integrity constraint violated")
        }
        AppError::Repo(RepoError::Timeout) => (codes::DB_TIMEOUT, "Database timeout"),
        _ => (codes::INTERNAL, "Unexpected error occurred"),
    };
    let hint = if status.is_server_error() {
        // Server-side detail goes to the logs via ErrorReport, not the wire.
        None
    } else {
        Some(err.to_string())
    };
    ApiError::new(status, code, message, hint)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so shared logging middleware can emit rich diagnostics.
        ErrorReport::from_message(
            "infra::http",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_a_hint() {
        let api = app_to_api(AppError::validation("name must not be empty"));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, codes::VALIDATION);
        assert!(api.hint.as_deref().unwrap().contains("name must not be empty"));
    }

    #[test]
    fn server_errors_hide_detail() {
        let api = app_to_api(AppError::unexpected("pool exploded"));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.hint.is_none());
    }
}
