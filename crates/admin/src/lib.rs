//! Artesania admin library.
//!
//! The back-office API: catalogue, news, artisan and customer management,
//! the order status workflow, encomenda handling and the dashboard. Exposed
//! as a library so the CLI can reuse the repositories for seeding.
//!
//! # Security
//!
//! Every `/api` route requires the `ADMIN_API_TOKEN` bearer token. Bind to a
//! private interface; the API has write access to the whole catalogue.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
