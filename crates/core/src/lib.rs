//! Artesania Core - Shared domain library.
//!
//! This crate provides the domain logic used across all Artesania components:
//! - `storefront` - Public marketplace API (catalogue, cart, checkout)
//! - `admin` - Back-office API (CRUD, order workflow, dashboard)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. With the `postgres` feature enabled, models and
//! ids also implement the sqlx traits needed to read them from rows.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money formatting, contact data, statuses
//! - [`cart`] - Shopping cart state and the pricing engine
//! - [`checkout`] - Shipping validation, draft orders, payment payloads
//! - [`envelope`] - JSON response envelope shared by both APIs
//! - [`models`] - Persistent entities and their input payloads
//! - [`pagination`] - Page/limit parameters shared by list endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod envelope;
pub mod models;
pub mod pagination;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartError, CartLine, CartTotals, CouponOutcome, PricingRules};
pub use envelope::Envelope;
pub use pagination::{PageParams, Pagination};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
