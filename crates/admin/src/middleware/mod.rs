//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Bearer token check on `/api` routes ([`RequireAdminToken`])

pub mod auth;
pub mod request_id;

pub use auth::RequireAdminToken;
pub use request_id::request_id_middleware;
