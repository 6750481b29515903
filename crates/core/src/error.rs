//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised only for deterministic business failures: a broken invariant, a
/// malformed value, an ownership mismatch. Use-case level failures such as
/// "client not found" are modelled by the application layer instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value or invariant check failed (negative money, insufficient
    /// balance, over-contribution, missing field, foreign child entity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Message carried by the error, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => msg,
        }
    }
}

/// Run a batch of field checks and fold every failure into one validation error.
///
/// Each check returns `Some(message)` when it fails. All checks run, so the
/// caller gets the full list of problems instead of the first one only.
pub fn validate_all<const N: usize>(checks: [Option<&str>; N]) -> DomainResult<()> {
    let failures: Vec<&str> = checks.into_iter().flatten().collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(failures.join("; ")))
    }
}

/// Fail with a validation error when `value` is empty or whitespace-only.
pub fn ensure_not_blank(value: &str, field: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_all_collects_every_failure() {
        let err = validate_all([Some("name is missing"), None, Some("email is missing")])
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("name is missing; email is missing".to_string())
        );
    }

    #[test]
    fn validate_all_passes_when_no_check_fails() {
        assert!(validate_all([None, None]).is_ok());
    }

    #[test]
    fn blank_strings_are_rejected() {
        let err = ensure_not_blank("   ", "Name").unwrap_err();
        assert_eq!(err.message(), "Name cannot be empty");
        assert!(ensure_not_blank(" Ana ", "Name").is_ok());
    }
}
