use async_trait::async_trait;
use uuid::Uuid;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{RepoError, SearchHit, SearchHitKind, SearchRepo};
use crate::domain::types::PostStatus;

use super::{
    PostgresRepositories,
    util::{like_pattern, map_sqlx_error},
};

// Matches across the three publicly visible content kinds. Snippets are
// truncated server-side so result payloads stay small.
const SEARCH_UNION: &str = "\
    SELECT 'post' AS kind, p.id, p.slug, p.title, left(p.excerpt, 240) AS snippet, \
           COALESCE(p.published_at, p.created_at) AS ranked_at \
    FROM posts p \
    WHERE p.status = $2 AND p.published_at IS NOT NULL \
      AND (p.title ILIKE $1 OR p.excerpt ILIKE $1 OR p.body_markdown ILIKE $1) \
    UNION ALL \
    SELECT 'service' AS kind, s.id, s.slug, s.title, left(s.summary, 240) AS snippet, \
           s.updated_at AS ranked_at \
    FROM services s \
    WHERE s.published AND (s.title ILIKE $1 OR s.summary ILIKE $1 OR s.body_markdown ILIKE $1) \
    UNION ALL \
    SELECT 'category' AS kind, c.id, c.slug, c.name AS title, left(c.description, 240) AS snippet, \
           c.updated_at AS ranked_at \
    FROM categories c \
    WHERE c.name ILIKE $1 OR c.description ILIKE $1";

#[derive(sqlx::FromRow)]
struct SearchHitRow {
    kind: String,
    id: Uuid,
    slug: String,
    title: String,
    snippet: String,
}

impl SearchHitRow {
    fn into_hit(self) -> Result<SearchHit, RepoError> {
        let kind = match self.kind.as_str() {
            "post" => SearchHitKind::Post,
            "service" => SearchHitKind::Service,
            "category" => SearchHitKind::Category,
            other => {
                return Err(RepoError::Integrity {
                    message: format!("unknown search hit kind `{other}`"),
                });
            }
        };
        Ok(SearchHit {
            kind,
            id: self.id,
            slug: self.slug,
            title: self.title,
            snippet: self.snippet,
        })
    }
}

#[async_trait]
impl SearchRepo for PostgresRepositories {
    async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<SearchHit>, RepoError> {
        let pattern = like_pattern(query);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ({SEARCH_UNION}) hits"))
                .bind(&pattern)
                .bind(PostStatus::Published)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        let rows = sqlx::query_as::<_, SearchHitRow>(&format!(
            "SELECT kind, id, slug, title, snippet FROM ({SEARCH_UNION}) hits \
             ORDER BY ranked_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(&pattern)
        .bind(PostStatus::Published)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(SearchHitRow::into_hit)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, Self::convert_count(total)?, page))
    }
}
