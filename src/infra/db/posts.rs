use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    CreatePostParams, PostFilter, PostListScope, PostMeta, PostsRepo, PostsWriteRepo,
    RepoError, UpdatePostParams,
};
use crate::domain::entities::{PostRecord, TagRecord};
use crate::domain::types::PostStatus;

use super::{PostgresRepositories, util::map_sqlx_error};

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.excerpt, p.body_markdown, p.body_html, \
     p.status, p.category_id, p.author_id, p.view_count, p.published_at, p.created_at, \
     p.updated_at";

#[derive(sqlx::FromRow)]
struct PostMetaRow {
    status: PostStatus,
    category_id: Option<Uuid>,
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE TRUE");
        Self::apply_scope_conditions(&mut count_qb, scope);
        Self::apply_post_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p WHERE TRUE"));
        Self::apply_scope_conditions(&mut qb, scope);
        Self::apply_post_filter(&mut qb, filter);
        qb.push(" ORDER BY COALESCE(p.published_at, p.created_at) DESC, p.id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<PostRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p \
             WHERE p.slug = $1 AND p.status = $2 AND p.published_at IS NOT NULL"
        ))
        .bind(slug)
        .bind(PostStatus::Published)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_posts(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p \
             WHERE p.status = $1 AND p.published_at IS NOT NULL \
             ORDER BY p.published_at DESC LIMIT $2"
        ))
        .bind(PostStatus::Published)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_tags_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        sqlx::query_as::<_, TagRecord>(
            "SELECT t.id, t.slug, t.name, t.created_at FROM tags t \
             INNER JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = $1 ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_post_meta(&self) -> Result<Vec<PostMeta>, RepoError> {
        let rows = sqlx::query_as::<_, PostMetaRow>("SELECT status, category_id FROM posts")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|row| PostMeta {
                status: row.status,
                category_id: row.category_id,
            })
            .collect())
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "INSERT INTO posts \
             (slug, title, excerpt, body_markdown, body_html, status, category_id, author_id, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            POST_COLUMNS.replace("p.", "")
        ))
        .bind(params.slug)
        .bind(params.title)
        .bind(params.excerpt)
        .bind(params.body_markdown)
        .bind(params.body_html)
        .bind(params.status)
        .bind(params.category_id)
        .bind(params.author_id)
        .bind(params.published_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "UPDATE posts SET slug = $2, title = $3, excerpt = $4, body_markdown = $5, \
             body_html = $6, category_id = $7, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            POST_COLUMNS.replace("p.", "")
        ))
        .bind(params.id)
        .bind(params.slug)
        .bind(params.title)
        .bind(params.excerpt)
        .bind(params.body_markdown)
        .bind(params.body_html)
        .bind(params.category_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_post_status(
        &self,
        id: Uuid,
        status: PostStatus,
        published_at: Option<OffsetDateTime>,
    ) -> Result<PostRecord, RepoError> {
        sqlx::query_as::<_, PostRecord>(&format!(
            "UPDATE posts SET status = $2, published_at = $3, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            POST_COLUMNS.replace("p.", "")
        ))
        .bind(id)
        .bind(status)
        .bind(published_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn replace_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if !tag_ids.is_empty() {
            let mut qb = QueryBuilder::new("INSERT INTO post_tags (post_id, tag_id) ");
            qb.push_values(tag_ids, |mut row, tag_id| {
                row.push_bind(post_id).push_bind(tag_id);
            });
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
