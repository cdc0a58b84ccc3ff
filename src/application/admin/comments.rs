use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{CommentFilter, CommentsRepo};
use crate::cache::{CacheStore, invalidate_prefix, keys};
use crate::domain::entities::CommentRecord;
use crate::domain::types::CommentStatus;

/// Comment moderation queue.
///
/// Approving or rejecting a comment changes what the public post view shows,
/// so every moderation action drops the `blog:` cache family.
#[derive(Clone)]
pub struct AdminCommentService {
    comments: Arc<dyn CommentsRepo>,
    store: Arc<dyn CacheStore>,
}

impl AdminCommentService {
    pub fn new(comments: Arc<dyn CommentsRepo>, store: Arc<dyn CacheStore>) -> Self {
        Self { comments, store }
    }

    pub async fn list(
        &self,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<CommentRecord>, AppError> {
        Ok(self.comments.list_comments(filter, page).await?)
    }

    pub async fn moderate(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<CommentRecord, AppError> {
        let comment = self.comments.update_comment_status(id, status).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.comments
            .find_comment_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.comments.delete_comment(id).await?;
        invalidate_prefix(self.store.as_ref(), keys::BLOG_PREFIX).await;
        Ok(())
    }
}
