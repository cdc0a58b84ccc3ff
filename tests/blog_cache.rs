//! Service-level behavior of the read-through cache: hits skip the
//! repository, expiry triggers a refetch, and back-office writes purge the
//! keys the public site reads through.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use praxis::application::admin::categories::AdminCategoryService;
use praxis::application::blog::{BlogService, BlogTtls};
use praxis::application::pagination::{Page, PageRequest};
use praxis::application::repos::{
    CategoriesRepo, CategoryWithCount, CommentFilter, CommentsRepo, CreateCategoryParams,
    CreateCommentParams, PostFilter, PostListScope, PostMeta, PostsRepo, RepoError,
    UpdateCategoryParams,
};
use praxis::cache::{CacheStore, ManualClock, MemoryStore};
use praxis::domain::entities::{CategoryRecord, CommentRecord, PostRecord, TagRecord};
use praxis::domain::types::{CommentStatus, PostStatus};

const POST_TTL: Duration = Duration::from_secs(43_200);
const LIST_TTL: Duration = Duration::from_secs(600);

fn sample_post(slug: &str) -> PostRecord {
    PostRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: "Estate Planning Basics".to_string(),
        excerpt: "What a will does and does not cover.".to_string(),
        body_markdown: "# Wills".to_string(),
        body_html: "<h1>Wills</h1>".to_string(),
        status: PostStatus::Published,
        category_id: None,
        author_id: None,
        view_count: 0,
        published_at: Some(OffsetDateTime::UNIX_EPOCH),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

fn sample_category(slug: &str, name: &str) -> CategoryRecord {
    CategoryRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: name.to_string(),
        description: String::new(),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

/// Serves one fixed post and counts repository round trips.
struct CountingPostsRepo {
    post: PostRecord,
    lookups: AtomicUsize,
    list_calls: AtomicUsize,
}

impl CountingPostsRepo {
    fn new(post: PostRecord) -> Self {
        Self {
            post,
            lookups: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PostsRepo for CountingPostsRepo {
    async fn list_posts(
        &self,
        _scope: PostListScope,
        _filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Page::new(vec![self.post.clone()], 1, page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        self.find_published_by_slug(slug).await
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if slug == self.post.slug {
            Ok(Some(self.post.clone()))
        } else {
            Ok(None)
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        if id == self.post.id {
            Ok(Some(self.post.clone()))
        } else {
            Ok(None)
        }
    }

    async fn recent_posts(&self, _limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        Ok(vec![self.post.clone()])
    }

    async fn increment_view_count(&self, _id: Uuid) -> Result<(), RepoError> {
        Ok(())
    }

    async fn list_tags_for_post(&self, _post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn list_post_meta(&self) -> Result<Vec<PostMeta>, RepoError> {
        Ok(Vec::new())
    }
}

/// Holds one category, counts count-listing calls, and accepts writes.
struct CountingCategoriesRepo {
    category: CategoryRecord,
    count_calls: AtomicUsize,
}

impl CountingCategoriesRepo {
    fn new(category: CategoryRecord) -> Self {
        Self {
            category,
            count_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CategoriesRepo for CountingCategoriesRepo {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(vec![self.category.clone()])
    }

    async fn list_category_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![CategoryWithCount {
            category: self.category.clone(),
            post_count: 3,
        }])
    }

    async fn find_category_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        if id == self.category.id {
            Ok(Some(self.category.clone()))
        } else {
            Ok(None)
        }
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        if slug == self.category.slug {
            Ok(Some(self.category.clone()))
        } else {
            Ok(None)
        }
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        Ok(CategoryRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            name: params.name,
            description: params.description,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        Ok(CategoryRecord {
            id: params.id,
            slug: params.slug,
            name: params.name,
            description: params.description,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    async fn delete_category(&self, _id: Uuid) -> Result<(), RepoError> {
        Ok(())
    }
}

struct NoCommentsRepo;

#[async_trait]
impl CommentsRepo for NoCommentsRepo {
    async fn list_comments(
        &self,
        _filter: &CommentFilter,
        page: PageRequest,
    ) -> Result<Page<CommentRecord>, RepoError> {
        Ok(Page::empty(page))
    }

    async fn list_approved_for_post(
        &self,
        _post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn find_comment_by_id(&self, _id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        Ok(None)
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        Ok(CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            author_name: params.author_name,
            author_email: params.author_email,
            body: params.body,
            status: CommentStatus::Pending,
            created_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    async fn update_comment_status(
        &self,
        _id: Uuid,
        _status: CommentStatus,
    ) -> Result<CommentRecord, RepoError> {
        Err(RepoError::NotFound)
    }

    async fn delete_comment(&self, _id: Uuid) -> Result<(), RepoError> {
        Ok(())
    }

    async fn list_comment_statuses(&self) -> Result<Vec<CommentStatus>, RepoError> {
        Ok(Vec::new())
    }
}

fn blog_service(
    posts: Arc<CountingPostsRepo>,
    categories: Arc<CountingCategoriesRepo>,
    store: Arc<dyn CacheStore>,
) -> BlogService {
    BlogService::new(
        posts,
        categories,
        Arc::new(NoCommentsRepo),
        store,
        BlogTtls {
            post: POST_TTL,
            list: LIST_TTL,
        },
    )
}

#[tokio::test]
async fn second_read_of_a_post_is_served_from_cache() {
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let store: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::new(NonZeroUsize::new(64).unwrap()));
    let blog = blog_service(posts.clone(), categories, store);

    let first = blog.post_by_slug("estate-planning").await.unwrap();
    let second = blog.post_by_slug("estate-planning").await.unwrap();

    assert_eq!(first.unwrap().post.slug, "estate-planning");
    assert_eq!(second.unwrap().post.slug, "estate-planning");
    assert_eq!(posts.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_post_entry_is_recomputed() {
    let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::with_clock(
        NonZeroUsize::new(64).unwrap(),
        clock.clone(),
    ));
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let blog = blog_service(posts.clone(), categories, store);

    blog.post_by_slug("estate-planning").await.unwrap();
    clock.advance(POST_TTL - Duration::from_secs(1));
    blog.post_by_slug("estate-planning").await.unwrap();
    assert_eq!(posts.lookups.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(1));
    blog.post_by_slug("estate-planning").await.unwrap();
    assert_eq!(posts.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_slug_is_cached_as_absent() {
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let store: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::new(NonZeroUsize::new(64).unwrap()));
    let blog = blog_service(posts.clone(), categories, store);

    assert!(blog.post_by_slug("no-such-post").await.unwrap().is_none());
    assert!(blog.post_by_slug("no-such-post").await.unwrap().is_none());
    assert_eq!(posts.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn category_write_purges_cached_listings() {
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let store: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::new(NonZeroUsize::new(64).unwrap()));
    let blog = blog_service(posts.clone(), categories.clone(), store.clone());
    let admin = AdminCategoryService::new(categories.clone(), store);

    blog.category_counts().await.unwrap();
    blog.category_counts().await.unwrap();
    assert_eq!(categories.count_calls.load(Ordering::SeqCst), 1);

    admin
        .create("Criminal Defense".to_string(), String::new())
        .await
        .unwrap();

    blog.category_counts().await.unwrap();
    assert_eq!(categories.count_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn listing_pages_cache_under_distinct_keys() {
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let store: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::new(NonZeroUsize::new(64).unwrap()));
    let blog = blog_service(posts.clone(), categories, store);

    let filter = PostFilter::default();
    blog.list_posts(&filter, PageRequest::new(1, 10)).await.unwrap();
    blog.list_posts(&filter, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(posts.list_calls.load(Ordering::SeqCst), 1);

    blog.list_posts(&filter, PageRequest::new(2, 10)).await.unwrap();
    assert_eq!(posts.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn search_listings_bypass_the_cache() {
    let posts = Arc::new(CountingPostsRepo::new(sample_post("estate-planning")));
    let categories = Arc::new(CountingCategoriesRepo::new(sample_category(
        "family-law",
        "Family Law",
    )));
    let store: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::new(NonZeroUsize::new(64).unwrap()));
    let blog = blog_service(posts.clone(), categories, store);

    let filter = PostFilter {
        search: Some("wills".to_string()),
        ..PostFilter::default()
    };
    blog.list_posts(&filter, PageRequest::new(1, 10)).await.unwrap();
    blog.list_posts(&filter, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(posts.list_calls.load(Ordering::SeqCst), 2);
}
