mod admin;
pub mod error;
mod middleware;
mod models;
mod public;

pub use admin::{AdminState, build_admin_router};
pub use public::{HttpState, build_public_router};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;

/// Liveness seam so routers can be exercised without a database.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), SqlxError>;
}

#[async_trait]
impl HealthCheck for crate::infra::db::PostgresRepositories {
    async fn ping(&self) -> Result<(), SqlxError> {
        self.health_check().await
    }
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
