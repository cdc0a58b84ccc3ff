//! Public blog read path, memoized through the cache helper.
//!
//! Every read composes a `blog:`-prefixed key so admin write paths can drop
//! the whole family with one prefix invalidation. Search-filtered listings
//! bypass the cache: the key space is unbounded and hit rates are near zero.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    CategoriesRepo, CategoryWithCount, CommentsRepo, CreateCommentParams, PostFilter,
    PostListScope, PostsRepo,
};
use crate::application::validate::{ensure_email, ensure_max_len, ensure_non_empty};
use crate::cache::{CacheStore, cached_fetch, keys};
use crate::domain::entities::{CommentRecord, PostRecord, TagRecord};

const MAX_COMMENT_LEN: usize = 5_000;
const MAX_RECENT_POSTS: u32 = 20;

/// Time-to-live windows for the blog key families: hours for a single post,
/// minutes for listings.
#[derive(Debug, Clone, Copy)]
pub struct BlogTtls {
    pub post: Duration,
    pub list: Duration,
}

impl Default for BlogTtls {
    fn default() -> Self {
        Self {
            post: Duration::from_secs(12 * 60 * 60),
            list: Duration::from_secs(10 * 60),
        }
    }
}

/// A published post joined with its tags and approved comments; the unit the
/// public post page renders and the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub post: PostRecord,
    pub tags: Vec<TagRecord>,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Clone)]
pub struct SubmitCommentCommand {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
}

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    comments: Arc<dyn CommentsRepo>,
    store: Arc<dyn CacheStore>,
    ttls: BlogTtls,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        comments: Arc<dyn CommentsRepo>,
        store: Arc<dyn CacheStore>,
        ttls: BlogTtls,
    ) -> Self {
        Self {
            posts,
            categories,
            comments,
            store,
            ttls,
        }
    }

    /// A published post with tags and approved comments, or `None`. The
    /// "not found" sentinel is cached like any other value.
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<PostView>, AppError> {
        let posts = self.posts.clone();
        let comments = self.comments.clone();
        let slug_owned = slug.to_string();

        cached_fetch(
            self.store.as_ref(),
            &keys::post_key(slug),
            self.ttls.post,
            move || async move {
                let Some(post) = posts.find_published_by_slug(&slug_owned).await? else {
                    return Ok(None);
                };
                let (tags, comments) = futures::try_join!(
                    posts.list_tags_for_post(post.id),
                    comments.list_approved_for_post(post.id),
                )?;
                Ok(Some(PostView {
                    post,
                    tags,
                    comments,
                }))
            },
        )
        .await
    }

    /// One page of the published listing. Category/tag filters take part in
    /// the cache key; search queries go straight to the repository.
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, AppError> {
        if filter.search.is_some() {
            return Ok(self
                .posts
                .list_posts(PostListScope::Public, filter, page)
                .await?);
        }

        let key = keys::post_list_key(
            page.page(),
            page.per_page(),
            filter.category.as_deref(),
            filter.tag.as_deref(),
        );
        let posts = self.posts.clone();
        let filter = filter.clone();

        cached_fetch(self.store.as_ref(), &key, self.ttls.list, move || async move {
            posts
                .list_posts(PostListScope::Public, &filter, page)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    pub async fn category_counts(&self) -> Result<Vec<CategoryWithCount>, AppError> {
        let categories = self.categories.clone();
        cached_fetch(
            self.store.as_ref(),
            &keys::category_counts_key(),
            self.ttls.list,
            move || async move {
                categories
                    .list_category_counts()
                    .await
                    .map_err(AppError::from)
            },
        )
        .await
    }

    pub async fn recent_posts(&self, limit: u32) -> Result<Vec<PostRecord>, AppError> {
        let limit = limit.clamp(1, MAX_RECENT_POSTS);
        let posts = self.posts.clone();
        cached_fetch(
            self.store.as_ref(),
            &keys::recent_posts_key(limit),
            self.ttls.list,
            move || async move { posts.recent_posts(limit).await.map_err(AppError::from) },
        )
        .await
    }

    /// Best-effort view counter. The increment runs detached; a failure is
    /// logged and never surfaces to the reader.
    pub fn record_view(&self, post_id: Uuid) {
        let posts = self.posts.clone();
        tokio::spawn(async move {
            if let Err(err) = posts.increment_view_count(post_id).await {
                warn!(
                    target = "praxis::blog",
                    post_id = %post_id,
                    error = %err,
                    "view count increment failed"
                );
            }
        });
    }

    /// Public comment submission; lands as `pending` and stays invisible
    /// until moderated, so no cache invalidation happens here.
    pub async fn submit_comment(
        &self,
        post_slug: &str,
        command: SubmitCommentCommand,
    ) -> Result<CommentRecord, AppError> {
        ensure_non_empty("author_name", &command.author_name)?;
        ensure_email("author_email", &command.author_email)?;
        ensure_non_empty("body", &command.body)?;
        ensure_max_len("body", &command.body, MAX_COMMENT_LEN)?;

        let post = self
            .posts
            .find_published_by_slug(post_slug)
            .await?
            .ok_or(AppError::NotFound)?;

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id: post.id,
                author_name: command.author_name.trim().to_string(),
                author_email: command.author_email.trim().to_string(),
                body: command.body.trim().to_string(),
            })
            .await?;

        Ok(comment)
    }
}
