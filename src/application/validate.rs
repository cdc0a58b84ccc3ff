//! Field validation helpers shared by intake and back-office commands.

use crate::application::error::AppError;

pub fn ensure_non_empty(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn ensure_max_len(field: &'static str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must not exceed {max} characters"
        )));
    }
    Ok(())
}

/// Shallow shape check; deliverability is the mail system's problem.
pub fn ensure_email(field: &'static str, value: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_rejected() {
        assert!(ensure_non_empty("title", "  ").is_err());
        assert!(ensure_non_empty("title", "Adverse Possession").is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(ensure_email("email", "client@example.com").is_ok());
        assert!(ensure_email("email", "client@localhost").is_err());
        assert!(ensure_email("email", "no-at-sign").is_err());
        assert!(ensure_email("email", "@example.com").is_err());
    }

    #[test]
    fn length_ceiling_counts_characters() {
        assert!(ensure_max_len("message", "short", 10).is_ok());
        assert!(ensure_max_len("message", "0123456789ab", 10).is_err());
    }
}
