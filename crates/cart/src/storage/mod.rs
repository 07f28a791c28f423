//! Durable key-value persistence for the cart.
//!
//! The cart lives in a single slot under a fixed key and is rewritten in
//! full after every mutation. [`CartSlot`] pairs a [`KeyValueStore`] with
//! that key and runs the versioned [`codec`].

pub mod codec;
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use rocketshoes_core::Cart;
use thiserror::Error;
use tracing::{debug, warn};

use codec::CodecError;

/// Errors raised by key-value stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The cart could not be encoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A string-to-string store that survives across sessions.
///
/// Mirrors the browser's local storage: whole values, no partial writes.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The persisted cart slot.
#[derive(Clone)]
pub struct CartSlot {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl CartSlot {
    /// Bind a store to the cart key.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Key the cart is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted cart.
    ///
    /// Fails closed: an absent, unreadable or invalid slot yields an empty
    /// cart and a warning.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No persisted cart, starting empty");
                return Cart::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted cart, starting empty");
                return Cart::new();
            }
        };

        match codec::decode(&raw) {
            Ok(cart) => {
                debug!(key = %self.key, lines = cart.len(), "Loaded persisted cart");
                cart
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding invalid persisted cart");
                Cart::new()
            }
        }
    }

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let encoded = codec::encode(cart)?;
        self.store.set(&self.key, &encoded)
    }
}
