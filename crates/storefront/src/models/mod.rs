//! Domain models for the storefront.
//!
//! Wire types live in `fortynine-core`; this module holds what the
//! storefront layers on top: session state and template view models.

pub mod cart;
pub mod session;

pub use cart::{CartLineView, CartSummary, CartView};
pub use session::{CurrentUser, PendingPayment, keys as session_keys};
