//! Site-wide search: one query fanned across posts, practice areas, and
//! categories, merged into a single paginated result set.

use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{SearchHit, SearchRepo};

const MIN_QUERY_LEN: usize = 2;
const MAX_QUERY_LEN: usize = 120;

#[derive(Clone)]
pub struct SearchService {
    repo: Arc<dyn SearchRepo>,
}

impl SearchService {
    pub fn new(repo: Arc<dyn SearchRepo>) -> Self {
        Self { repo }
    }

    /// Results are never cached: the key space is caller-controlled and
    /// effectively unbounded.
    pub async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<SearchHit>, AppError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Err(AppError::validation(format!(
                "search query must be at least {MIN_QUERY_LEN} characters"
            )));
        }
        if trimmed.chars().count() > MAX_QUERY_LEN {
            return Err(AppError::validation(format!(
                "search query must not exceed {MAX_QUERY_LEN} characters"
            )));
        }

        Ok(self.repo.search(trimmed, page).await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::{RepoError, SearchHitKind};

    struct StaticSearchRepo;

    #[async_trait]
    impl SearchRepo for StaticSearchRepo {
        async fn search(
            &self,
            query: &str,
            page: PageRequest,
        ) -> Result<Page<SearchHit>, RepoError> {
            let hit = SearchHit {
                kind: SearchHitKind::Post,
                id: uuid::Uuid::nil(),
                slug: "hit".to_string(),
                title: query.to_string(),
                snippet: String::new(),
            };
            Ok(Page::new(vec![hit], 1, page))
        }
    }

    #[tokio::test]
    async fn short_queries_are_rejected() {
        let service = SearchService::new(Arc::new(StaticSearchRepo));
        let err = service
            .search(" a ", PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn query_is_trimmed_before_dispatch() {
        let service = SearchService::new(Arc::new(StaticSearchRepo));
        let page = service
            .search("  estate planning  ", PageRequest::default())
            .await
            .expect("results");
        assert_eq!(page.items[0].title, "estate planning");
    }
}
