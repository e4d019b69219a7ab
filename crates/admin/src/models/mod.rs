//! Domain models for the admin panel.
//!
//! Wire types live in `fortynine-core`; this module holds session state.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
