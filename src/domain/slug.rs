//! Deterministic, human-friendly slug generation.
//!
//! Consumers provide their own uniqueness predicate (usually a repository
//! lookup) so slug derivation itself stays pure. Collisions are resolved by
//! suffixing a monotonic counter (`-2`, `-3`, ...).

use std::future::Future;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors from generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the candidate does not
/// already exist.
pub async fn generate_unique_slug<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    #[derive(Debug, Error)]
    #[error("predicate failed")]
    struct PredicateFailure;

    #[test]
    fn derives_ascii_slugs() {
        assert_eq!(
            derive_slug("Estate Planning & Probate").expect("slug"),
            "estate-planning-probate"
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[tokio::test]
    async fn suffixes_on_collision() {
        let taken = ["family-law".to_string(), "family-law-2".to_string()];
        let slug = generate_unique_slug("Family Law", |candidate| {
            let unique = !taken.contains(&candidate.to_string());
            async move { Ok::<_, Infallible>(unique) }
        })
        .await
        .expect("slug");
        assert_eq!(slug, "family-law-3");
    }

    #[tokio::test]
    async fn predicate_errors_propagate() {
        let result = generate_unique_slug("Family Law", |_| async {
            Err::<bool, _>(PredicateFailure)
        })
        .await;
        assert!(matches!(result, Err(SlugAsyncError::Predicate(_))));
    }
}
