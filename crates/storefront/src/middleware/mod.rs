//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on checkout and encomenda submission (governor)

pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use rate_limit::submission_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
