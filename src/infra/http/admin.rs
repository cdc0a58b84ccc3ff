//! Back-office JSON surface.
//!
//! The admin router binds to a loopback address by default; access control is
//! a deployment concern (reverse proxy or tunnel), not an application one.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router, middleware};
use serde_json::json;
use uuid::Uuid;

use crate::application::admin::appointments::AdminAppointmentService;
use crate::application::admin::categories::AdminCategoryService;
use crate::application::admin::comments::AdminCommentService;
use crate::application::admin::contact::AdminContactService;
use crate::application::admin::notifications::NotificationService;
use crate::application::admin::posts::{
    AdminPostService, CreatePostCommand, UpdatePostCommand,
};
use crate::application::admin::reports::ReportService;
use crate::application::admin::services::{AdminServiceService, UpsertServiceCommand};
use crate::application::admin::tags::AdminTagService;
use crate::application::admin::users::AdminUserService;
use crate::application::pagination::PageRequest;
use crate::application::repos::{CommentFilter, PostFilter};
use crate::cache::{CacheStore, invalidate_prefix, keys};

use super::error::{ApiError, app_to_api};
use super::middleware::{log_responses, set_request_context};
use super::models::*;
use super::{HealthCheck, db_health_response};

#[derive(Clone)]
pub struct AdminState {
    pub posts: AdminPostService,
    pub categories: AdminCategoryService,
    pub tags: AdminTagService,
    pub comments: AdminCommentService,
    pub services: AdminServiceService,
    pub appointments: AdminAppointmentService,
    pub contact: AdminContactService,
    pub users: AdminUserService,
    pub reports: ReportService,
    pub notifications: NotificationService,
    pub store: Arc<dyn CacheStore>,
    pub db: Arc<dyn HealthCheck>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/status", patch(update_post_status))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", put(rename_tag).delete(delete_tag))
        .route("/api/comments", get(list_comments))
        .route("/api/comments/{id}", axum::routing::delete(delete_comment))
        .route("/api/comments/{id}/status", patch(moderate_comment))
        .route("/api/services", get(list_services).post(create_service))
        .route("/api/services/reorder", post(reorder_services))
        .route(
            "/api/services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/api/appointments", get(list_appointments))
        .route("/api/appointments/{id}", get(get_appointment))
        .route(
            "/api/appointments/{id}/status",
            patch(update_appointment_status),
        )
        .route("/api/contact-messages", get(list_contact_messages))
        .route("/api/contact-messages/{id}", get(get_contact_message))
        .route(
            "/api/contact-messages/{id}/status",
            patch(update_contact_status),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/reports/content", get(content_report))
        .route("/api/reports/appointments", get(appointment_report))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/cache/purge", post(purge_cache))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
        .with_state(state)
}

async fn health(State(state): State<AdminState>) -> impl IntoResponse {
    db_health_response(state.db.ping().await)
}

// Posts

async fn list_posts(
    State(state): State<AdminState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PostFilter {
        category: query.category,
        tag: query.tag,
        search: query.q,
    };
    let page = state
        .posts
        .list(
            query.status,
            &filter,
            PageRequest::from_query(query.page, query.per_page),
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn get_post(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.load(id).await.map_err(app_to_api)?;
    Ok(Json(post))
}

async fn create_post(
    State(state): State<AdminState>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .posts
        .create(CreatePostCommand {
            title: payload.title,
            excerpt: payload.excerpt,
            body_markdown: payload.body_markdown,
            status: payload.status,
            category_id: payload.category_id,
            author_id: payload.author_id,
            tag_ids: payload.tag_ids,
        })
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .posts
        .update(UpdatePostCommand {
            id,
            slug: payload.slug,
            title: payload.title,
            excerpt: payload.excerpt,
            body_markdown: payload.body_markdown,
            category_id: payload.category_id,
            tag_ids: payload.tag_ids,
        })
        .await
        .map_err(app_to_api)?;
    Ok(Json(post))
}

async fn update_post_status(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .posts
        .update_status(id, payload.status)
        .await
        .map_err(app_to_api)?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Categories

async fn list_categories(
    State(state): State<AdminState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await.map_err(app_to_api)?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AdminState>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create(payload.name, payload.description)
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .update(id, payload.slug, payload.name, payload.description)
        .await
        .map_err(app_to_api)?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Tags

async fn list_tags(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.tags.list().await.map_err(app_to_api)?;
    Ok(Json(tags))
}

async fn create_tag(
    State(state): State<AdminState>,
    Json(payload): Json<TagCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state.tags.create(payload.name).await.map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn rename_tag(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state
        .tags
        .rename(id, payload.name)
        .await
        .map_err(app_to_api)?;
    Ok(Json(tag))
}

async fn delete_tag(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.tags.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Comments

async fn list_comments(
    State(state): State<AdminState>,
    Query(query): Query<CommentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CommentFilter {
        status: query.status,
        post_id: query.post_id,
    };
    let page = state
        .comments
        .list(&filter, PageRequest::from_query(query.page, query.per_page))
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn moderate_comment(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comments
        .moderate(id, payload.status)
        .await
        .map_err(app_to_api)?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.comments.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Practice areas

async fn list_services(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    let services = state.services.list().await.map_err(app_to_api)?;
    Ok(Json(services))
}

async fn get_service(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.services.load(id).await.map_err(app_to_api)?;
    Ok(Json(service))
}

async fn create_service(
    State(state): State<AdminState>,
    Json(payload): Json<ServiceUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .create(UpsertServiceCommand {
            title: payload.title,
            summary: payload.summary,
            body_markdown: payload.body_markdown,
            published: payload.published,
        })
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn update_service(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServiceUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .update(
            id,
            payload.slug,
            UpsertServiceCommand {
                title: payload.fields.title,
                summary: payload.fields.summary,
                body_markdown: payload.fields.body_markdown,
                published: payload.fields.published,
            },
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(service))
}

async fn reorder_services(
    State(state): State<AdminState>,
    Json(payload): Json<ServiceReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .reorder(payload.ids)
        .await
        .map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_service(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Appointments

async fn list_appointments(
    State(state): State<AdminState>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .appointments
        .list(
            query.status,
            PageRequest::from_query(query.page, query.per_page),
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn get_appointment(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state.appointments.load(id).await.map_err(app_to_api)?;
    Ok(Json(appointment))
}

async fn update_appointment_status(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .appointments
        .update_status(id, payload.status)
        .await
        .map_err(app_to_api)?;
    Ok(Json(appointment))
}

// Contact messages

async fn list_contact_messages(
    State(state): State<AdminState>,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .contact
        .list(
            query.status,
            PageRequest::from_query(query.page, query.per_page),
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn get_contact_message(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.contact.load(id).await.map_err(app_to_api)?;
    Ok(Json(message))
}

async fn update_contact_status(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .contact
        .update_status(id, payload.status)
        .await
        .map_err(app_to_api)?;
    Ok(Json(message))
}

// Users

async fn list_users(
    State(state): State<AdminState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .users
        .list(PageRequest::from_query(query.page, query.per_page))
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn get_user(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.load(id).await.map_err(app_to_api)?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AdminState>,
    Json(payload): Json<UserCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .create(payload.email, payload.display_name, payload.role)
        .await
        .map_err(app_to_api)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .update(
            id,
            payload.email,
            payload.display_name,
            payload.role,
            payload.active,
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete(id).await.map_err(app_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// Reports

async fn content_report(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.reports.content_report().await.map_err(app_to_api)?;
    Ok(Json(report))
}

async fn appointment_report(
    State(state): State<AdminState>,
    Query(query): Query<ReportRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .reports
        .appointment_report(query.from, query.to)
        .await
        .map_err(app_to_api)?;
    Ok(Json(report))
}

// Notifications

async fn list_notifications(
    State(state): State<AdminState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .notifications
        .list(
            query.unread_only,
            PageRequest::from_query(query.page, query.per_page),
        )
        .await
        .map_err(app_to_api)?;
    Ok(Json(page))
}

async fn mark_notification_read(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state
        .notifications
        .mark_read(id)
        .await
        .map_err(app_to_api)?;
    Ok(Json(notification))
}

// Cache

async fn purge_cache(
    State(state): State<AdminState>,
    Json(payload): Json<CachePurgeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prefixes: Vec<&str> = match payload.prefix.as_deref() {
        Some(keys::BLOG_PREFIX) => vec![keys::BLOG_PREFIX],
        Some(keys::SERVICES_PREFIX) => vec![keys::SERVICES_PREFIX],
        Some(other) => {
            return Err(ApiError::bad_request(
                "unknown cache prefix",
                Some(format!("`{other}` is not a managed key family")),
            ));
        }
        None => vec![keys::BLOG_PREFIX, keys::SERVICES_PREFIX],
    };

    for prefix in &prefixes {
        invalidate_prefix(state.store.as_ref(), prefix).await;
    }

    Ok(Json(json!({ "purged": prefixes })))
}
