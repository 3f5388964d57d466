//! Custom-order requests (encomendas).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::types::{Email, EncomendaId, EncomendaStatus, Phone};
use crate::validation::ValidationErrors;

/// Minimum description length, so the workshop has something to quote on.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A request for a made-to-order piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Encomenda {
    pub id: EncomendaId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub product_type: Option<String>,
    pub description: String,
    pub quantity: i32,
    pub desired_date: Option<NaiveDate>,
    pub status: EncomendaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the public request form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncomendaInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub desired_date: Option<NaiveDate>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEncomenda {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub product_type: Option<String>,
    pub description: String,
    pub quantity: i32,
    pub desired_date: Option<NaiveDate>,
}

impl EncomendaInput {
    /// Validate the request form.
    ///
    /// `today` bounds `desired_date`: a date in the past is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for each invalid field.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidEncomenda, ValidationErrors> {
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

        let description = self.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            errors.add(
                "description",
                format!("descreva a peça com pelo menos {MIN_DESCRIPTION_LEN} caracteres"),
            );
        }

        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            errors.add("quantity", "quantidade deve ser pelo menos 1");
        }

        if let Some(date) = self.desired_date
            && date < today
        {
            errors.add("desired_date", "data desejada já passou");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(ValidEncomenda {
                name: self.name.trim().to_owned(),
                email,
                phone,
                product_type: non_blank(self.product_type.as_deref()),
                description: description.to_owned(),
                quantity,
                desired_date: self.desired_date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_validate_defaults_quantity() {
        let input = EncomendaInput {
            name: "Beatriz".to_owned(),
            email: "bia@exemplo.com".to_owned(),
            description: "Toalha de mesa bordada com 8 lugares".to_owned(),
            ..EncomendaInput::default()
        };
        let valid = input.validate(today()).unwrap();
        assert_eq!(valid.quantity, 1);
        assert_eq!(valid.product_type, None);
    }

    #[test]
    fn test_validate_rejects_short_description_and_past_date() {
        let input = EncomendaInput {
            name: "Beatriz".to_owned(),
            email: "bia@exemplo.com".to_owned(),
            description: "toalha".to_owned(),
            quantity: Some(0),
            desired_date: NaiveDate::from_ymd_opt(2026, 5, 31),
            ..EncomendaInput::default()
        };
        let errors = input.validate(today()).unwrap_err();
        assert!(errors.has("description"));
        assert!(errors.has("quantity"));
        assert!(errors.has("desired_date"));
    }
}
