//! Cache key composition.
//!
//! Keys are plain `<domain>:<resource>:<params...>` strings so that callers
//! can invalidate a whole family with one prefix deletion. High-cardinality
//! parameters (list filters) are folded into a single hash segment.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const BLOG_PREFIX: &str = "blog:";
pub const SERVICES_PREFIX: &str = "services:";

/// Key for a single published post, fetched by slug.
pub fn post_key(slug: &str) -> String {
    format!("blog:post:{slug}")
}

/// Key for one page of the public post listing.
pub fn post_list_key(
    page: u32,
    per_page: u32,
    category: Option<&str>,
    tag: Option<&str>,
) -> String {
    let filter_hash = hash_filter(category, tag);
    format!("blog:list:{page}:{per_page}:{filter_hash:016x}")
}

/// Key for the category listing with per-category post counts.
pub fn category_counts_key() -> String {
    "blog:categories".to_string()
}

/// Key for the `limit` most recent published posts.
pub fn recent_posts_key(limit: u32) -> String {
    format!("blog:recent:{limit}")
}

/// Key for a single published practice area, fetched by slug.
pub fn service_key(slug: &str) -> String {
    format!("services:item:{slug}")
}

/// Key for the ordered listing of published practice areas.
pub fn service_list_key() -> String {
    "services:list".to_string()
}

fn hash_filter(category: Option<&str>, tag: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    category.hash(&mut hasher);
    tag.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_keys_embed_the_slug() {
        assert_eq!(post_key("my-slug"), "blog:post:my-slug");
        assert!(post_key("my-slug").starts_with(BLOG_PREFIX));
    }

    #[test]
    fn list_keys_are_stable_per_filter() {
        let a = post_list_key(1, 10, Some("family-law"), None);
        let b = post_list_key(1, 10, Some("family-law"), None);
        assert_eq!(a, b);
    }

    #[test]
    fn list_keys_differ_across_filters_and_pages() {
        let base = post_list_key(1, 10, None, None);
        assert_ne!(base, post_list_key(2, 10, None, None));
        assert_ne!(base, post_list_key(1, 20, None, None));
        assert_ne!(base, post_list_key(1, 10, Some("family-law"), None));
        assert_ne!(base, post_list_key(1, 10, None, Some("estates")));
    }

    #[test]
    fn service_keys_share_the_services_prefix() {
        assert!(service_key("probate").starts_with(SERVICES_PREFIX));
        assert!(service_list_key().starts_with(SERVICES_PREFIX));
    }
}
