//! RocketShoes cart library.
//!
//! Client-side cart state: stock-checked add, remove and quantity updates,
//! mirrored to a durable key-value slot after every mutation.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and is constructed once, then cloned
//!   into every consumer (no ambient global)
//! - [`api`] talks to the storefront REST API (`/stock/{id}`, `/products/{id}`)
//! - [`storage`] persists the cart through a versioned codec
//! - [`notify`] surfaces user-facing feedback
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::notify::TracingNotifier;
//! use rocketshoes_cart::{CartConfig, CartStore};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config, Arc::new(TracingNotifier))?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! println!("{} items", store.cart().item_count());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use config::CartConfig;
pub use error::{CartError, Result};
pub use notify::{Notification, Notifier, Severity};
pub use store::{AmountUpdate, CartChange, CartStore};
