//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use serde::{Deserialize, Serialize};

use fortynine_core::checkout::PaymentFlow;
use fortynine_core::types::{AddressId, Rupees, UserId};

/// Session-stored user identity.
///
/// Holds the bearer token the commerce API issued at login. The token never
/// leaves the server; browsers only ever see the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's commerce API ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: String,
    /// Bearer token replayed on customer-scoped API calls.
    pub token: String,
}

/// Checkout state parked in the session while the customer is off in the
/// hosted payment widget.
///
/// Written when the gateway order is registered, read back by the
/// confirmation handler, and cleared once the order exists (or the payment
/// is abandoned). The flow remembers which gateway order it expects, so a
/// confirmation for any other order is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayment {
    /// Where the attempt stands, normally awaiting the widget's
    /// confirmation.
    pub flow: PaymentFlow,
    /// Delivery address chosen before payment.
    pub address_id: AddressId,
    /// Payable total locked in when the gateway order was created.
    pub total: Rupees,
    /// Key that makes the order-creation POST safe to retry.
    pub idempotency_key: String,
}

/// Session keys for authentication and checkout data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the in-flight online payment, if any.
    pub const PENDING_PAYMENT: &str = "pending_payment";

    /// Key for the email awaiting OTP verification after signup.
    pub const PENDING_SIGNUP_EMAIL: &str = "pending_signup_email";
}
