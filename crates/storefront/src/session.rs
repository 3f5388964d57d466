//! Session-stored shopping state.
//!
//! The cart and the draft order awaiting payment live in the visitor's
//! server-side session, keyed by the session cookie.

use tower_sessions::Session;

use artesania_core::Cart;
use artesania_core::checkout::DraftOrder;

use crate::error::Result;

/// Session keys.
pub mod keys {
    /// The visitor's cart.
    pub const CART: &str = "cart";

    /// Draft order created at checkout, consumed by the payment return.
    pub const DRAFT_ORDER: &str = "draft_order";
}

/// The session cart, or an empty one.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store `cart` in the session.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// The pending draft order, if any.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn load_draft(session: &Session) -> Result<Option<DraftOrder>> {
    Ok(session.get::<DraftOrder>(keys::DRAFT_ORDER).await?)
}

/// Store the draft order awaiting payment, replacing any previous one.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn save_draft(session: &Session, draft: &DraftOrder) -> Result<()> {
    session.insert(keys::DRAFT_ORDER, draft).await?;
    Ok(())
}

/// Forget the cart and the draft once the order is stored.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn finish_checkout(session: &Session) -> Result<()> {
    session.remove::<DraftOrder>(keys::DRAFT_ORDER).await?;
    session.remove::<Cart>(keys::CART).await?;
    Ok(())
}
