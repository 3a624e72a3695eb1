//! Paddyhouse Core - Shared types library.
//!
//! This crate provides common types used across all Paddyhouse components:
//! - `server` - The marketplace web application
//! - `integration-tests` - End-to-end checkout/cart/inventory tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, account roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
