//! Repository traits describing persistence adapters.
//!
//! Every adapter is injected as an `Arc<dyn Trait>` so services can be
//! exercised against stub implementations in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::entities::{
    AppointmentRecord, CategoryRecord, CommentRecord, ContactMessageRecord, NotificationRecord,
    PostRecord, ServiceRecord, TagRecord, UserRecord,
};
use crate::domain::types::{
    AppointmentStatus, CommentStatus, ContactStatus, PostStatus, UserRole,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Box::new(err))
    }
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum PostListScope {
    Public,
    Admin { status: Option<PostStatus> },
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub body_html: String,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub body_html: String,
    pub category_id: Option<Uuid>,
}

/// Status/category projection of a post, fetched for report grouping.
#[derive(Debug, Clone, Copy)]
pub struct PostMeta {
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, RepoError>;

    /// Find by slug in any status; used by the back office and slug checks.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    /// Find by slug restricted to published posts; the public read path.
    async fn find_published_by_slug(&self, slug: &str)
    -> Result<Option<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    async fn recent_posts(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError>;

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError>;

    async fn list_tags_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;

    async fn list_post_meta(&self) -> Result<Vec<PostMeta>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post_status(
        &self,
        id: Uuid,
        status: PostStatus,
        published_at: Option<OffsetDateTime>,
    ) -> Result<PostRecord, RepoError>;

    async fn replace_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

// ============================================================================
// Categories and tags
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: CategoryRecord,
    pub post_count: u64,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub slug: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateCategoryParams {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    /// Categories with their published-post counts, ordered by name.
    async fn list_category_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError>;

    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_tag_by_id(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;

    async fn create_tag(&self, slug: String, name: String) -> Result<TagRecord, RepoError>;

    async fn rename_tag(&self, id: Uuid, slug: String, name: String)
    -> Result<TagRecord, RepoError>;

    async fn delete_tag(&self, id: Uuid) -> Result<(), RepoError>;
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub status: Option<CommentStatus>,
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub body: String,
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn list_comments(
        &self,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<CommentRecord>, RepoError>;

    async fn list_approved_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError>;

    async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError>;

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError>;

    async fn update_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<CommentRecord, RepoError>;

    async fn delete_comment(&self, id: Uuid) -> Result<(), RepoError>;

    async fn list_comment_statuses(&self) -> Result<Vec<CommentStatus>, RepoError>;
}

// ============================================================================
// Services (practice areas)
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateServiceParams {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub body_html: String,
    pub position: i32,
    pub published: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateServiceParams {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub body_html: String,
    pub published: bool,
}

#[async_trait]
pub trait ServicesRepo: Send + Sync {
    async fn list_services(&self, published_only: bool)
    -> Result<Vec<ServiceRecord>, RepoError>;

    async fn find_service_by_id(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError>;

    async fn find_service_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ServiceRecord>, RepoError>;

    async fn create_service(
        &self,
        params: CreateServiceParams,
    ) -> Result<ServiceRecord, RepoError>;

    async fn update_service(
        &self,
        params: UpdateServiceParams,
    ) -> Result<ServiceRecord, RepoError>;

    /// Assign positions following the order of `ids`.
    async fn reorder_services(&self, ids: &[Uuid]) -> Result<(), RepoError>;

    async fn delete_service(&self, id: Uuid) -> Result<(), RepoError>;
}

// ============================================================================
// Intake: appointments and contact messages
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateAppointmentParams {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_id: Option<Uuid>,
    pub preferred_at: Option<OffsetDateTime>,
    pub message: String,
}

/// Status/time projection of an appointment, fetched for report grouping.
#[derive(Debug, Clone, Copy)]
pub struct AppointmentMeta {
    pub status: AppointmentStatus,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait AppointmentsRepo: Send + Sync {
    async fn create_appointment(
        &self,
        params: CreateAppointmentParams,
    ) -> Result<AppointmentRecord, RepoError>;

    async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
        page: PageRequest,
    ) -> Result<Page<AppointmentRecord>, RepoError>;

    async fn find_appointment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AppointmentRecord>, RepoError>;

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, RepoError>;

    async fn list_appointment_meta(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<AppointmentMeta>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateContactMessageParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn create_contact_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError>;

    async fn list_contact_messages(
        &self,
        status: Option<ContactStatus>,
        page: PageRequest,
    ) -> Result<Page<ContactMessageRecord>, RepoError>;

    async fn find_contact_message_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactMessageRecord>, RepoError>;

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactMessageRecord, RepoError>;
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct UpdateUserParams {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub active: bool,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn list_users(&self, page: PageRequest) -> Result<Page<UserRecord>, RepoError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError>;

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError>;
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateNotificationParams {
    pub kind: String,
    pub subject_id: Option<Uuid>,
    pub summary: String,
}

#[async_trait]
pub trait NotificationsRepo: Send + Sync {
    async fn insert_notification(
        &self,
        params: CreateNotificationParams,
    ) -> Result<NotificationRecord, RepoError>;

    async fn list_notifications(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationRecord>, RepoError>;

    async fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRecord, RepoError>;
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchHitKind {
    Post,
    Service,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub kind: SearchHitKind,
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub snippet: String,
}

#[async_trait]
pub trait SearchRepo: Send + Sync {
    /// Union of matches across posts, services, and categories.
    async fn search(&self, query: &str, page: PageRequest)
    -> Result<Page<SearchHit>, RepoError>;
}
