//! Services the route handlers call into.
//!
//! - `payments` - hosted checkout provider client
//! - `postal_code` - cached CEP lookup
//! - `email` - transactional email (order confirmation, encomenda notice)
//! - `orders` - order placement shared by the payment return and the API

pub mod email;
pub mod orders;
pub mod payments;
pub mod postal_code;

pub use email::{EmailError, EmailService};
pub use payments::{CheckoutSession, PaymentClient, PaymentError};
pub use postal_code::{PostalAddress, PostalCodeClient, PostalCodeLookupError};
