//! Artisans who make the products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::checkout::STATES;
use crate::types::ArtisanId;
use crate::validation::ValidationErrors;

/// A maker with a public profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Artisan {
    pub id: ArtisanId,
    pub name: String,
    pub bio: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub specialty: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for an artisan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtisanInput {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ArtisanInput {
    /// Check the name and, when given, the UF.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for a blank name or an unknown state.
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);

        let state = non_blank(self.state.as_deref()).map(|s| s.to_uppercase());
        if let Some(uf) = &state
            && !STATES.contains(&uf.as_str())
        {
            errors.add("state", "UF inválida");
        }

        errors.into_result(Self {
            name: self.name.trim().to_owned(),
            bio: self.bio.trim().to_owned(),
            city: non_blank(self.city.as_deref()),
            state,
            specialty: non_blank(self.specialty.as_deref()),
            image_url: non_blank(self.image_url.as_deref()),
        })
    }
}
