//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;
pub mod stock;

pub use cart::{Cart, CartLine};
pub use id::*;
pub use product::{Product, format_price};
pub use stock::StockInfo;
