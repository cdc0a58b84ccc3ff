//! Translation from sqlx failures and raw search terms into repository
//! vocabulary.

use std::borrow::Cow;

use sqlx::error::ErrorKind;

use crate::application::repos::RepoError;

// SQLSTATE codes with no constraint-kind classification in sqlx.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const QUERY_CANCELED: &str = "57014";

/// Classify a sqlx failure into a [`RepoError`] by constraint kind and
/// SQLSTATE code. Message text is carried for diagnostics, never matched on.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    let db = match err {
        sqlx::Error::RowNotFound => return RepoError::NotFound,
        sqlx::Error::Database(db) => db,
        other => return RepoError::from_persistence(other),
    };

    match db.kind() {
        ErrorKind::UniqueViolation => RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        ErrorKind::ForeignKeyViolation => RepoError::InvalidInput {
            message: db.message().to_string(),
        },
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => RepoError::Integrity {
            message: db.message().to_string(),
        },
        _ => {
            let code = db.code().map(Cow::into_owned);
            match code.as_deref() {
                Some(INVALID_TEXT_REPRESENTATION) => RepoError::InvalidInput {
                    message: db.message().to_string(),
                },
                Some(QUERY_CANCELED) => RepoError::Timeout,
                _ => RepoError::from_persistence(sqlx::Error::Database(db)),
            }
        }
    }
}

/// Wrap a user-supplied term for `ILIKE`, escaping the pattern
/// metacharacters so the term matches literally.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
