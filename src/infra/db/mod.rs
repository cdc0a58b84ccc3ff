//! Postgres-backed repository implementations.
//!
//! All queries are built at runtime with `QueryBuilder` and mapped through
//! `FromRow`; no compile-time-checked macros, so the crate builds without a
//! live database.

mod appointments;
mod categories;
mod comments;
mod contact;
mod notifications;
mod posts;
mod search;
mod services;
mod tags;
mod users;
mod util;

pub use util::map_sqlx_error;
use util::like_pattern;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{PostFilter, PostListScope, RepoError};
use crate::domain::types::PostStatus;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_scope_conditions(qb: &mut QueryBuilder<'_, Postgres>, scope: PostListScope) {
        match scope {
            PostListScope::Public => {
                qb.push(" AND p.status = ");
                qb.push_bind(PostStatus::Published);
                qb.push(" AND p.published_at IS NOT NULL ");
            }
            PostListScope::Admin { status } => {
                if let Some(status) = status {
                    qb.push(" AND p.status = ");
                    qb.push_bind(status);
                }
            }
        }
    }

    fn apply_post_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PostFilter) {
        if let Some(category) = filter.category.as_ref() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM categories c WHERE c.id = p.category_id AND c.slug = ",
            );
            qb.push_bind(category);
            qb.push(")");
        }

        if let Some(tag) = filter.tag.as_ref() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM post_tags pt INNER JOIN tags t ON t.id = pt.tag_id WHERE pt.post_id = p.id AND t.slug = ",
            );
            qb.push_bind(tag);
            qb.push(")");
        }

        if let Some(search) = filter.search.as_ref() {
            let pattern = like_pattern(search);
            qb.push(" AND (");
            qb.push("p.title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR p.slug ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR p.excerpt ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value.try_into().map_err(|_| RepoError::Integrity {
            message: "count exceeds supported range".to_string(),
        })
    }
}
