//! Email address type.
//!
//! Login, registration and profile forms all collect an email address. The
//! remote API performs the authoritative check; this type only rejects input
//! that could never be an address so the form can fail without a round trip.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty or only whitespace.
    #[error("email is required")]
    Empty,
    /// The input is longer than an address can be.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not have the `local@domain` shape.
    #[error("'{0}' is not a valid email address")]
    Malformed(String),
}

/// A trimmed, structurally valid email address.
///
/// ```
/// use shopfront_core::Email;
///
/// assert_eq!(Email::parse("  jane@example.com ").unwrap().as_str(), "jane@example.com");
/// assert!(Email::parse("jane").is_err());
/// assert!(Email::parse("jane@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or is not
    /// exactly one non-empty local part and one non-empty domain joined by `@`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !s.contains(char::is_whitespace) =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed(s.to_owned())),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
