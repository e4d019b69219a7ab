//! 49 Stores Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! Admin sessions carry a staff bearer token for the commerce API, which
//! accepts order-status updates and location edits only from admin
//! accounts. Keep this binary off the public internet.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
