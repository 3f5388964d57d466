//! Brazilian phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains characters other than digits and common separators.
    #[error("phone may only contain digits, spaces, parentheses, dashes and a leading +")]
    InvalidCharacters,
    /// Wrong number of digits once separators are removed.
    #[error("phone must have 10 or 11 digits including area code (got {0})")]
    InvalidLength(usize),
}

/// A phone number stored as digits only: area code plus 8 (landline) or
/// 9 (mobile) digits. A leading `+55` country code is accepted and dropped.
///
/// ```
/// use artesania_core::Phone;
///
/// let phone = Phone::parse("(11) 98765-4321").unwrap();
/// assert_eq!(phone.as_str(), "11987654321");
/// assert_eq!(phone.to_string(), "(11) 98765-4321");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number, stripping formatting.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] for unexpected characters or a wrong digit count.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed
            .chars()
            .any(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '-' | '+' | '.')))
        {
            return Err(PhoneError::InvalidCharacters);
        }

        let mut digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        if trimmed.starts_with('+')
            && let Some(national) = digits.strip_prefix("55")
        {
            digits = national.to_owned();
        }

        match digits.len() {
            10 | 11 => Ok(Self(digits)),
            n => Err(PhoneError::InvalidLength(n)),
        }
    }

    /// Returns the digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (area, rest) = self.0.split_at(2);
        let (head, tail) = rest.split_at(rest.len() - 4);
        write!(f, "({area}) {head}-{tail}")
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}
