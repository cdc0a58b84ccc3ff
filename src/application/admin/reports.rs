//! Back-office summary reports.
//!
//! Aggregation happens in memory over narrow metadata projections rather
//! than in SQL; the data volumes here are small and this keeps the grouping
//! rules in one testable place.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::application::error::AppError;
use crate::application::repos::{
    AppointmentsRepo, CategoriesRepo, CommentsRepo, PostsRepo,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentReport {
    pub posts_by_status: BTreeMap<String, u64>,
    pub posts_by_category: BTreeMap<String, u64>,
    pub comments_by_status: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentReport {
    pub by_status: BTreeMap<String, u64>,
    pub by_day: BTreeMap<Date, u64>,
}

const UNCATEGORIZED: &str = "(uncategorized)";

#[derive(Clone)]
pub struct ReportService {
    posts: Arc<dyn PostsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    comments: Arc<dyn CommentsRepo>,
    appointments: Arc<dyn AppointmentsRepo>,
}

impl ReportService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        comments: Arc<dyn CommentsRepo>,
        appointments: Arc<dyn AppointmentsRepo>,
    ) -> Self {
        Self {
            posts,
            categories,
            comments,
            appointments,
        }
    }

    pub async fn content_report(&self) -> Result<ContentReport, AppError> {
        let (meta, categories, comment_statuses) = futures::try_join!(
            self.posts.list_post_meta(),
            self.categories.list_categories(),
            self.comments.list_comment_statuses(),
        )?;

        let category_names: BTreeMap<_, _> = categories
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut posts_by_status = BTreeMap::new();
        let mut posts_by_category = BTreeMap::new();
        for entry in &meta {
            *posts_by_status
                .entry(entry.status.as_str().to_string())
                .or_insert(0) += 1;
            let category = entry
                .category_id
                .and_then(|id| category_names.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            *posts_by_category.entry(category).or_insert(0) += 1;
        }

        let mut comments_by_status = BTreeMap::new();
        for status in &comment_statuses {
            *comments_by_status
                .entry(status.as_str().to_string())
                .or_insert(0) += 1;
        }

        Ok(ContentReport {
            posts_by_status,
            posts_by_category,
            comments_by_status,
        })
    }

    pub async fn appointment_report(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<AppointmentReport, AppError> {
        if from > to {
            return Err(AppError::validation("report range start is after its end"));
        }

        let meta = self.appointments.list_appointment_meta(from, to).await?;

        let mut by_status = BTreeMap::new();
        let mut by_day = BTreeMap::new();
        for entry in &meta {
            *by_status
                .entry(entry.status.as_str().to_string())
                .or_insert(0) += 1;
            *by_day.entry(entry.created_at.date()).or_insert(0) += 1;
        }

        Ok(AppointmentReport { by_status, by_day })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;
    use crate::application::pagination::{Page, PageRequest};
    use crate::application::repos::{
        AppointmentMeta, CommentFilter, CreateAppointmentParams, CreateCategoryParams,
        CreateCommentParams, PostFilter, PostListScope, PostMeta, RepoError,
        UpdateCategoryParams,
    };
    use crate::domain::entities::{
        AppointmentRecord, CategoryRecord, CommentRecord, PostRecord, TagRecord,
    };
    use crate::domain::types::{AppointmentStatus, CommentStatus, PostStatus};

    struct MetaPostsRepo {
        meta: Vec<PostMeta>,
    }

    #[async_trait]
    impl PostsRepo for MetaPostsRepo {
        async fn list_posts(
            &self,
            _scope: PostListScope,
            _filter: &PostFilter,
            _page: PageRequest,
        ) -> Result<Page<PostRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_by_slug(&self, _slug: &str) -> Result<Option<PostRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_published_by_slug(
            &self,
            _slug: &str,
        ) -> Result<Option<PostRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<PostRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn recent_posts(&self, _limit: u32) -> Result<Vec<PostRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn increment_view_count(&self, _id: Uuid) -> Result<(), RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_tags_for_post(&self, _post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_post_meta(&self) -> Result<Vec<PostMeta>, RepoError> {
            Ok(self.meta.clone())
        }
    }

    struct NamedCategoriesRepo {
        categories: Vec<CategoryRecord>,
    }

    #[async_trait]
    impl CategoriesRepo for NamedCategoriesRepo {
        async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
            Ok(self.categories.clone())
        }

        async fn list_category_counts(
            &self,
        ) -> Result<Vec<crate::application::repos::CategoryWithCount>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_category_by_id(
            &self,
            _id: Uuid,
        ) -> Result<Option<CategoryRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_category_by_slug(
            &self,
            _slug: &str,
        ) -> Result<Option<CategoryRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn create_category(
            &self,
            _params: CreateCategoryParams,
        ) -> Result<CategoryRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn update_category(
            &self,
            _params: UpdateCategoryParams,
        ) -> Result<CategoryRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn delete_category(&self, _id: Uuid) -> Result<(), RepoError> {
            unimplemented!("not exercised by reports")
        }
    }

    struct StatusCommentsRepo {
        statuses: Vec<CommentStatus>,
    }

    #[async_trait]
    impl CommentsRepo for StatusCommentsRepo {
        async fn list_comments(
            &self,
            _filter: &CommentFilter,
            _page: PageRequest,
        ) -> Result<Page<CommentRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_approved_for_post(
            &self,
            _post_id: Uuid,
        ) -> Result<Vec<CommentRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_comment_by_id(
            &self,
            _id: Uuid,
        ) -> Result<Option<CommentRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn create_comment(
            &self,
            _params: CreateCommentParams,
        ) -> Result<CommentRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn update_comment_status(
            &self,
            _id: Uuid,
            _status: CommentStatus,
        ) -> Result<CommentRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn delete_comment(&self, _id: Uuid) -> Result<(), RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_comment_statuses(&self) -> Result<Vec<CommentStatus>, RepoError> {
            Ok(self.statuses.clone())
        }
    }

    struct MetaAppointmentsRepo {
        meta: Vec<AppointmentMeta>,
    }

    #[async_trait]
    impl AppointmentsRepo for MetaAppointmentsRepo {
        async fn create_appointment(
            &self,
            _params: CreateAppointmentParams,
        ) -> Result<AppointmentRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_appointments(
            &self,
            _status: Option<AppointmentStatus>,
            _page: PageRequest,
        ) -> Result<Page<AppointmentRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn find_appointment_by_id(
            &self,
            _id: Uuid,
        ) -> Result<Option<AppointmentRecord>, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn update_appointment_status(
            &self,
            _id: Uuid,
            _status: AppointmentStatus,
        ) -> Result<AppointmentRecord, RepoError> {
            unimplemented!("not exercised by reports")
        }

        async fn list_appointment_meta(
            &self,
            _from: OffsetDateTime,
            _to: OffsetDateTime,
        ) -> Result<Vec<AppointmentMeta>, RepoError> {
            Ok(self.meta.clone())
        }
    }

    fn category(name: &str) -> CategoryRecord {
        let now = datetime!(2025-01-01 00:00 UTC);
        CategoryRecord {
            id: Uuid::new_v4(),
            slug: name.to_lowercase(),
            name: name.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        posts: Vec<PostMeta>,
        categories: Vec<CategoryRecord>,
        statuses: Vec<CommentStatus>,
        appointments: Vec<AppointmentMeta>,
    ) -> ReportService {
        ReportService::new(
            Arc::new(MetaPostsRepo { meta: posts }),
            Arc::new(NamedCategoriesRepo { categories }),
            Arc::new(StatusCommentsRepo { statuses }),
            Arc::new(MetaAppointmentsRepo { meta: appointments }),
        )
    }

    #[tokio::test]
    async fn content_report_groups_by_status_and_category_name() {
        let family = category("Family Law");
        let family_id = family.id;
        let report = service(
            vec![
                PostMeta {
                    status: PostStatus::Published,
                    category_id: Some(family_id),
                },
                PostMeta {
                    status: PostStatus::Published,
                    category_id: None,
                },
                PostMeta {
                    status: PostStatus::Draft,
                    category_id: Some(family_id),
                },
            ],
            vec![family],
            vec![CommentStatus::Pending, CommentStatus::Approved, CommentStatus::Pending],
            Vec::new(),
        )
        .content_report()
        .await
        .expect("report");

        assert_eq!(report.posts_by_status.get("published"), Some(&2));
        assert_eq!(report.posts_by_status.get("draft"), Some(&1));
        assert_eq!(report.posts_by_category.get("Family Law"), Some(&2));
        assert_eq!(report.posts_by_category.get(UNCATEGORIZED), Some(&1));
        assert_eq!(report.comments_by_status.get("pending"), Some(&2));
    }

    #[tokio::test]
    async fn appointment_report_buckets_by_day() {
        let report = service(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![
                AppointmentMeta {
                    status: AppointmentStatus::New,
                    created_at: datetime!(2025-03-10 09:00 UTC),
                },
                AppointmentMeta {
                    status: AppointmentStatus::New,
                    created_at: datetime!(2025-03-10 17:30 UTC),
                },
                AppointmentMeta {
                    status: AppointmentStatus::Confirmed,
                    created_at: datetime!(2025-03-11 08:00 UTC),
                },
            ],
        )
        .appointment_report(
            datetime!(2025-03-01 00:00 UTC),
            datetime!(2025-04-01 00:00 UTC),
        )
        .await
        .expect("report");

        assert_eq!(report.by_status.get("new"), Some(&2));
        assert_eq!(report.by_status.get("confirmed"), Some(&1));
        assert_eq!(
            report.by_day.get(&datetime!(2025-03-10 00:00 UTC).date()),
            Some(&2)
        );
    }

    #[tokio::test]
    async fn appointment_report_rejects_inverted_range() {
        let result = service(Vec::new(), Vec::new(), Vec::new(), Vec::new())
            .appointment_report(
                datetime!(2025-04-01 00:00 UTC),
                datetime!(2025-03-01 00:00 UTC),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
