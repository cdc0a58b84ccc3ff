//! Request and query payloads for both listeners.

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{
    AppointmentStatus, CommentStatus, ContactStatus, PostStatus, UserRole,
};

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PostListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub status: Option<PostStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CommentCreateRequest {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentCreateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub service_slug: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub preferred_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactCreateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

// Back-office payloads.

#[derive(Debug, Deserialize)]
pub struct PostCreateRequest {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub body_markdown: String,
    #[serde(default = "default_post_status")]
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

fn default_post_status() -> PostStatus {
    PostStatus::Draft
}

#[derive(Debug, Deserialize)]
pub struct PostUpdateRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub body_markdown: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PostStatusRequest {
    pub status: PostStatus,
}

#[derive(Debug, Deserialize)]
pub struct CategoryCreateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdateRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct TagCreateRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CommentListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<CommentStatus>,
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CommentStatusRequest {
    pub status: CommentStatus,
}

#[derive(Debug, Deserialize)]
pub struct ServiceUpsertRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body_markdown: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServiceUpdateRequest {
    pub slug: String,
    #[serde(flatten)]
    pub fields: ServiceUpsertRequest,
}

#[derive(Debug, Deserialize)]
pub struct ServiceReorderRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppointmentListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize, Default)]
pub struct ContactListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusRequest {
    pub status: ContactStatus,
}

#[derive(Debug, Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportRangeQuery {
    #[serde(with = "time::serde::rfc3339")]
    pub from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to: OffsetDateTime,
}

#[derive(Debug, Deserialize, Default)]
pub struct NotificationListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CachePurgeRequest {
    /// Key-family prefix to drop; all known families when omitted.
    pub prefix: Option<String>,
}
