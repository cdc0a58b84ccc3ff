//! Back-office post management.
//!
//! Every successful write drops the whole `blog:` cache family; entries are
//! repopulated lazily by the public read path.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::render::render_markdown;
use crate::application::repos::{
    CreatePostParams, PostFilter, PostListScope, PostsRepo, PostsWriteRepo, UpdatePostParams,
};
use crate::application::validate::ensure_non_empty;
use crate::cache::{CacheStore, invalidate_prefix, keys};
use crate::domain::entities::PostRecord;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug};
use crate::domain::types::PostStatus;

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct AdminPostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    store: Arc<dyn CacheStore>,
}

impl AdminPostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            reader,
            writer,
            store,
        }
    }

    pub async fn list(
        &self,
        status: Option<PostStatus>,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, AppError> {
        Ok(self
            .reader
            .list_posts(PostListScope::Admin { status }, filter, page)
            .await?)
    }

    pub async fn load(&self, id: Uuid) -> Result<PostRecord, AppError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, command: CreatePostCommand) -> Result<PostRecord, AppError> {
        ensure_non_empty("title", &command.title)?;
        ensure_non_empty("body_markdown", &command.body_markdown)?;

        let slug = self.derive_unique_slug(&command.title).await?;
        let body_html = render_markdown(&command.body_markdown);
        let published_at = match command.status {
            PostStatus::Published => Some(OffsetDateTime::now_utc()),
            PostStatus::Draft | PostStatus::Archived => None,
        };

        let post = self
            .writer
            .create_post(CreatePostParams {
                slug,
                title: command.title,
                excerpt: command.excerpt,
                body_markdown: command.body_markdown,
                body_html,
                status: command.status,
                category_id: command.category_id,
                author_id: command.author_id,
                published_at,
            })
            .await?;

        if !command.tag_ids.is_empty() {
            self.writer.replace_tags(post.id, &command.tag_ids).await?;
        }

        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(post)
    }

    pub async fn update(&self, command: UpdatePostCommand) -> Result<PostRecord, AppError> {
        ensure_non_empty("slug", &command.slug)?;
        ensure_non_empty("title", &command.title)?;
        ensure_non_empty("body_markdown", &command.body_markdown)?;

        let body_html = render_markdown(&command.body_markdown);
        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: command.id,
                slug: command.slug,
                title: command.title,
                excerpt: command.excerpt,
                body_markdown: command.body_markdown,
                body_html,
                category_id: command.category_id,
            })
            .await?;

        self.writer.replace_tags(post.id, &command.tag_ids).await?;

        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(post)
    }

    /// Transition status; first publication stamps `published_at`.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: PostStatus,
    ) -> Result<PostRecord, AppError> {
        let current = self.load(id).await?;
        let published_at = match status {
            PostStatus::Published => {
                Some(current.published_at.unwrap_or_else(OffsetDateTime::now_utc))
            }
            PostStatus::Draft | PostStatus::Archived => current.published_at,
        };

        let post = self
            .writer
            .update_post_status(id, status, published_at)
            .await?;

        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.load(id).await?;
        self.writer.delete_post(id).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(())
    }

    async fn derive_unique_slug(&self, title: &str) -> Result<String, AppError> {
        let reader = self.reader.clone();
        generate_unique_slug(title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. }) => {
                AppError::validation("title cannot be turned into a slug")
            }
            SlugAsyncError::Slug(SlugError::Exhausted { base }) => {
                AppError::validation(format!("no free slug variant for `{base}`"))
            }
            SlugAsyncError::Predicate(repo) => AppError::from(repo),
        })
    }
}
