//! Catalogue products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::types::{ArtisanId, ProductId};
use crate::validation::ValidationErrors;

/// A handcrafted product for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub artisan_id: Option<ArtisanId>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can be sold right now.
    #[must_use]
    pub fn can_fulfil(&self, quantity: u32) -> bool {
        self.active && i64::from(self.stock) >= i64::from(quantity)
    }
}

/// Create/replace payload for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub artisan_id: Option<ArtisanId>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductInput {
    /// Check required fields and ranges, returning a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for a blank name or category, a negative
    /// price, or negative stock.
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("category", &self.category);
        if self.price.is_sign_negative() && !self.price.is_zero() {
            errors.add("price", "preço não pode ser negativo");
        }
        if self.stock < 0 {
            errors.add("stock", "estoque não pode ser negativo");
        }

        errors.into_result(Self {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            category: self.category.trim().to_lowercase(),
            price: self.price,
            stock: self.stock,
            image_url: non_blank(self.image_url.as_deref()),
            artisan_id: self.artisan_id,
            featured: self.featured,
            active: self.active,
        })
    }
}
