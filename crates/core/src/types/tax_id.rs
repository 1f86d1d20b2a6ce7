//! Invoice tax identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// The input is empty or whitespace-only.
    #[error("tax id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("tax id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A tax identifier printed on the invoice (CPF or CNPJ).
///
/// The checkout only requires the value to be present; it is not checked
/// against the document-number algorithms, matching what the invoice step
/// has always accepted.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length after trimming: 1-32 characters
///
/// ## Examples
///
/// ```
/// use vetmart_core::TaxId;
///
/// assert!(TaxId::parse("123.456.789-09").is_ok());
/// assert_eq!(TaxId::parse("  12345678909 ").unwrap().as_str(), "12345678909");
///
/// assert!(TaxId::parse("").is_err());
/// assert!(TaxId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Maximum length of a tax identifier, punctuation included.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `TaxId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(TaxIdError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(TaxIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the tax id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
