//! Customers (marketplace users).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Email, Phone};
use crate::validation::ValidationErrors;

/// A customer record, created by the back-office or on first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A customer payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
}

impl CustomerInput {
    /// Validate name, email and optional phone.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for each invalid field.
    pub fn validate(&self) -> Result<ValidCustomer, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", format!("e-mail inválido ({e})")))
            .ok();
        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Phone::parse(raw)
                .map_err(|_| errors.add("phone", "telefone inválido"))
                .ok(),
        };

        match email {
            Some(email) if errors.is_empty() => Ok(ValidCustomer {
                name: self.name.trim().to_owned(),
                email,
                phone,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_optional_phone() {
        let input = CustomerInput {
            name: "Carlos".to_owned(),
            email: "CARLOS@exemplo.com".to_owned(),
            phone: Some(" ".to_owned()),
        };
        let valid = input.validate().unwrap();
        assert_eq!(valid.email.as_str(), "carlos@exemplo.com");
        assert_eq!(valid.phone, None);
    }

    #[test]
    fn test_validate_bad_phone_and_email() {
        let input = CustomerInput {
            name: "Carlos".to_owned(),
            email: "carlos".to_owned(),
            phone: Some("123".to_owned()),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("phone"));
    }
}
