pub mod freelance;
pub mod registration;
pub mod storefront;
pub mod tutoring;

use crate::auth::{JwtError, PasswordError};
use crate::types::ValueError;

/// Failure of a portal operation, mapped onto HTTP statuses by `ApiError`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{field}: {problem}")]
    InvalidField { field: &'static str, problem: String },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Password(String),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("{0}")]
    Export(String),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

    pub fn invalid(field: &'static str, problem: impl Into<String>) -> Self {
        ServiceError::InvalidField {
            field,
            problem: problem.into(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Password(err.to_string())
    }
}

impl From<ValueError> for ServiceError {
    fn from(err: ValueError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reject blank required text fields.
pub fn require_text(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(field, "is required"));
    }
    Ok(())
}

/// Reject passwords shorter than the accepted minimum.
pub fn require_password(value: &str) -> ServiceResult<()> {
    if value.chars().count() < crate::auth::password::MIN_PASSWORD_LENGTH {
        return Err(ServiceError::invalid(
            "password",
            format!(
                "must be at least {} characters",
                crate::auth::password::MIN_PASSWORD_LENGTH
            ),
        ));
    }
    Ok(())
}

/// Minimal shape check for e-mail addresses.
pub fn require_email(value: &str) -> ServiceResult<()> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ServiceError::invalid("email", "is not a valid e-mail address"));
    }
    Ok(())
}

/// Ratings are whole stars from 1 to 5.
pub fn require_rating(rating: i32) -> ServiceResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ServiceError::invalid("rating", "must be between 1 and 5"));
    }
    Ok(())
}

/// Case-insensitive substring pattern for `ILIKE ... ESCAPE '\'`, with the
/// caller's `%`, `_` and `\` matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("title", "  ").is_err());
        assert!(require_text("title", "Algebra").is_ok());
    }

    #[test]
    fn password_minimum_length() {
        assert!(require_password("12345").is_err());
        assert!(require_password("123456").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(require_email("ali@example.com").is_ok());
        assert!(require_email("ali@localhost").is_err());
        assert!(require_email("@example.com").is_err());
        assert!(require_email("no-at-sign").is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(require_rating(0).is_err());
        assert!(require_rating(1).is_ok());
        assert!(require_rating(5).is_ok());
        assert!(require_rating(6).is_err());
    }

    #[test]
    fn search_wildcards_are_literal() {
        assert_eq!(contains_pattern("phone"), "%phone%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern(r"c:\x"), r"%c:\\x%");
    }
}
