//! RocketShoes Core - Shared types library.
//!
//! This crate provides the domain types used across all RocketShoes components:
//! - `cart` - Cart store, gateways and persistence
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, catalog records, stock levels and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
