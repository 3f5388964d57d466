//! Brazilian postal code (CEP).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The CEP does not have exactly eight digits.
    #[error("postal code must have 8 digits")]
    InvalidFormat,
}

/// An eight-digit CEP, stored without the dash.
///
/// Accepts `01310-100`, `01310100` and `01.310-100`.
///
/// ```
/// use artesania_core::PostalCode;
///
/// let cep = PostalCode::parse("01310-100").unwrap();
/// assert_eq!(cep.as_str(), "01310100");
/// assert_eq!(cep.to_string(), "01310-100");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a CEP, removing `-` and `.` separators.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::InvalidFormat`] unless exactly eight digits remain.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let cleaned: String = s.trim().chars().filter(|c| !matches!(c, '-' | '.')).collect();
        if cleaned.len() == 8 && cleaned.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(cleaned))
        } else {
            Err(PostalCodeError::InvalidFormat)
        }
    }

    /// Returns the eight digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, suffix) = self.0.split_at(5);
        write!(f, "{prefix}-{suffix}")
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(cep: PostalCode) -> Self {
        cep.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_separators() {
        assert!(PostalCode::parse("01.310-100").is_ok());
        assert!(PostalCode::parse(" 30130010 ").is_ok());
    }

    #[test]
    fn test_parse_rejects_wrong_length_or_letters() {
        assert_eq!(
            PostalCode::parse("0131010"),
            Err(PostalCodeError::InvalidFormat)
        );
        assert_eq!(
            PostalCode::parse("0131A-100"),
            Err(PostalCodeError::InvalidFormat)
        );
    }
}
