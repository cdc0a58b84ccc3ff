//! Public JSON surface: posts, practice areas, search, and intake.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};

use crate::application::blog::{BlogService, SubmitCommentCommand};
use crate::application::intake::{
    IntakeService, SubmitAppointmentCommand, SubmitContactCommand,
};
use crate::application::pagination::PageRequest;
use crate::application::practice::PracticeService;
use crate::application::repos::PostFilter;
use crate::application::search::SearchService;

use super::error::{ApiError, app_to_api};
use super::middleware::{log_responses, set_request_context};
use super::models::*;
use super::{HealthCheck, db_health_response};

#[derive(Clone)]
pub struct HttpState {
    pub blog: BlogService,
    pub practice: PracticeService,
    pub search: SearchService,
    pub intake: IntakeService,
    pub db: Arc<dyn HealthCheck>,
}

pub fn build_public_router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/recent", get(recent_posts))
        .route("/api/posts/{slug}", get(get_post))
        .route("/api/posts/{slug}/comments", post(submit_comment))
        .route("/api/categories", get(list_categories))
        .route("/api/services", get(list_services))
        .route("/api/services/{slug}", get(get_service))
        .route("/api/search", get(search))
        .route("/api/appointments", post(submit_appointment))
        .route("/api/contact", post(submit_contact))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
        .with_state(state)
}

async fn health(State(state): State<HttpState>) -> impl IntoResponse {
    db_health_response(state.db.ping().await)
}

async fn list_posts(
    State(state): State<HttpState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PostFilter {
        category: query.category,
        tag: query.tag,
        search: query.q,
    };
    let page = state
        .blog
        .list_posts(&filter, PageRequest::from_query(query.page, query.per_page))
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn recent_posts(
    State(state): State<HttpState>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .blog
        .recent_posts(query.limit.unwrap_or(5))
        .await
        .map_err(app_to_api)?;
    Ok(Json(posts))
}

async fn get_post(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.blog.post_by_slug(&slug).await.map_err(app_to_api)? {
        Some(view) => {
            state.blog.record_view(view.post.id);
            Ok(Json(view))
        }
        None => Err(ApiError::not_found("post not found")),
    }
}

async fn submit_comment(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .blog
        .submit_comment(
            &slug,
            SubmitCommentCommand {
                author_name: payload.author_name,
                author_email: payload.author_email,
                body: payload.body,
            },
        )
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_categories(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.blog.category_counts().await.map_err(app_to_api)?;
    Ok(Json(categories))
}

async fn list_services(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let services = state.practice.list().await.map_err(app_to_api)?;
    Ok(Json(services))
}

async fn get_service(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.practice.by_slug(&slug).await.map_err(app_to_api)? {
        Some(service) => Ok(Json(service)),
        None => Err(ApiError::not_found("practice area not found")),
    }
}

async fn search(
    State(state): State<HttpState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = state
        .search
        .search(
            &query.q,
            PageRequest::from_query(query.page, query.per_page),
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(hits))
}

async fn submit_appointment(
    State(state): State<HttpState>,
    Json(payload): Json<AppointmentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .intake
        .submit_appointment(SubmitAppointmentCommand {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            service_slug: payload.service_slug,
            preferred_at: payload.preferred_at,
            message: payload.message,
        })
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn submit_contact(
    State(state): State<HttpState>,
    Json(payload): Json<ContactCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .intake
        .submit_contact(SubmitContactCommand {
            name: payload.name,
            email: payload.email,
            subject: payload.subject,
            message: payload.message,
        })
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(message)))
}
