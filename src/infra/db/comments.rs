use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    CommentFilter, CommentsRepo, CreateCommentParams, RepoError,
};
use crate::domain::entities::CommentRecord;
use crate::domain::types::CommentStatus;

use super::{PostgresRepositories, util::map_sqlx_error};

const COMMENT_COLUMNS: &str = "id, post_id, author_name, author_email, body, status, created_at";

fn apply_comment_filter(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &CommentFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    if let Some(post_id) = filter.post_id {
        qb.push(" AND post_id = ");
        qb.push_bind(post_id);
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn list_comments(
        &self,
        filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<CommentRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM comments WHERE TRUE");
        apply_comment_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE TRUE"
        ));
        apply_comment_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<CommentRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn list_approved_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        sqlx::query_as::<_, CommentRecord>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = $1 AND status = $2 ORDER BY created_at"
        ))
        .bind(post_id)
        .bind(CommentStatus::Approved)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        sqlx::query_as::<_, CommentRecord>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        sqlx::query_as::<_, CommentRecord>(&format!(
            "INSERT INTO comments (post_id, author_name, author_email, body) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(params.post_id)
        .bind(params.author_name)
        .bind(params.author_email)
        .bind(params.body)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<CommentRecord, RepoError> {
        sqlx::query_as::<_, CommentRecord>(&format!(
            "UPDATE comments SET status = $2 WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_comment_statuses(&self) -> Result<Vec<CommentStatus>, RepoError> {
        sqlx::query_scalar::<_, CommentStatus>("SELECT status FROM comments")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
