//! 49 Stores Core - Shared domain library.
//!
//! This crate provides the domain types and checkout logic used across all
//! 49 Stores components:
//! - `storefront` - Public-facing shop (port 3000)
//! - `admin` - Internal order and location management (port 3001)
//! - `cli` - Command-line tools for location imports and health checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. Everything here is deterministic and unit-testable:
//! cart arithmetic, the payment resolution state machine, address and
//! location validation, and the wire types for the commerce backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`pricing`] - Cart totals and minimum-order eligibility
//! - [`checkout`] - Payment resolution state machine
//! - [`location`] - Serviceable-location table and address validation
//! - [`api`] - Request/response types for the commerce backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod location;
pub mod pricing;
pub mod types;

pub use types::*;
