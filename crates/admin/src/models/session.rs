//! Session-related types.

use serde::{Deserialize, Serialize};

use fortynine_core::types::UserId;

/// Session-stored staff identity.
///
/// Only accounts the backend flags as admin ever make it in here; the
/// login handler refuses everyone else. The bearer token never leaves
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Staff member's commerce API ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Staff member's email address.
    pub email: String,
    /// Bearer token replayed on staff-scoped API calls.
    pub token: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in staff member.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
