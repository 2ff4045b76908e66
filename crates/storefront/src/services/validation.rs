//! Local form validation run before any remote call.

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{Email, EmailError, MAX_RATING};
use thiserror::Error;

/// Form input rejected before reaching the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty or only whitespace.
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0}")]
    Email(#[from] EmailError),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Rating must be between 1 and {max}, got {rating}")]
    RatingOutOfRange { rating: u8, max: u8 },
}

/// Trimmed `value`, or an error naming `field` when it is blank.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for blank input.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value)
}

/// # Errors
///
/// Returns [`ValidationError::Email`] if `value` is not an address.
pub fn email(value: &str) -> Result<Email, ValidationError> {
    Ok(Email::parse(value)?)
}

/// Require a non-empty password.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for an empty password.
pub fn password(value: &SecretString) -> Result<(), ValidationError> {
    if value.expose_secret().is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::PasswordMismatch`] when the two differ.
pub fn passwords_match(
    password: &SecretString,
    confirm: &SecretString,
) -> Result<(), ValidationError> {
    if password.expose_secret() != confirm.expose_secret() {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::RatingOutOfRange`] outside `1..=5`.
pub const fn rating(value: u8) -> Result<u8, ValidationError> {
    if value < 1 || value > MAX_RATING {
        return Err(ValidationError::RatingOutOfRange {
            rating: value,
            max: MAX_RATING,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Name", "  Ada "), Ok("Ada"));
        assert_eq!(required("Name", "   "), Err(ValidationError::Required("Name")));
    }

    #[test]
    fn test_email() {
        assert!(email("ada@example.com").is_ok());
        assert!(matches!(email("ada"), Err(ValidationError::Email(_))));
    }

    #[test]
    fn test_passwords() {
        assert!(password(&secret("")).is_err());
        assert!(passwords_match(&secret("hunter2"), &secret("hunter2")).is_ok());
        assert_eq!(
            passwords_match(&secret("hunter2"), &secret("hunter3")),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_rating_range() {
        assert_eq!(rating(1), Ok(1));
        assert_eq!(rating(5), Ok(5));
        assert!(rating(0).is_err());
        assert_eq!(
            rating(6).unwrap_err().to_string(),
            "Rating must be between 1 and 5, got 6"
        );
    }
}
