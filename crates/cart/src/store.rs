//! The cart store.
//!
//! [`CartStore`] owns the cart, validates every change against live stock,
//! persists the full cart before committing it in memory, and emits one
//! notification per outcome.
//!
//! # Operations
//!
//! | Operation | Stock rule | On success |
//! |-----------|------------|------------|
//! | [`add_product`](CartStore::add_product) | stock must exceed 1 | new line with amount 1, or +1 on an existing line |
//! | [`update_product_amount`](CartStore::update_product_amount) | `0 < amount <= stock` | amount replaced |
//! | [`remove_product`](CartStore::remove_product) | none | line removed |
//!
//! # Concurrency
//!
//! The store is cheap to clone and can be shared across tasks. Mutations are
//! serialized: each one holds an async lock from its first gateway call until
//! its commit, so overlapping operations (a double-clicked "add") never act
//! on a stale cart. Reads never wait on that lock.

use std::sync::Arc;

use rocketshoes_core::{Cart, CartLine, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, CatalogGateway, StockGateway};
use crate::config::CartConfig;
use crate::error::{CartError, Operation, Result};
use crate::notify::{Notification, Notifier};
use crate::storage::{CartSlot, FileStore, StorageError};

/// Stock at or below this level blocks `add_product`.
///
/// A product with exactly one unit left can be raised through
/// `update_product_amount` but never added. Kept as-is pending product-owner
/// confirmation.
pub const ADD_STOCK_FLOOR: i64 = 1;

/// Shown after a new line is added.
pub const ADDED_MESSAGE: &str = "Product added to cart";

/// Shown after a line is removed.
pub const REMOVED_MESSAGE: &str = "Product removed from cart";

/// Request to set the amount held for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountUpdate {
    pub product_id: ProductId,
    pub amount: u32,
}

impl AmountUpdate {
    #[must_use]
    pub const fn new(product_id: ProductId, amount: u32) -> Self {
        Self { product_id, amount }
    }
}

/// What a successful operation committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line with amount 1.
    Added(ProductId),
    /// A line was removed.
    Removed(ProductId),
    /// The amount of a line was replaced (also the result of adding a
    /// product already in the cart).
    AmountUpdated { product_id: ProductId, amount: u32 },
}

/// Shopping cart state shared by every consumer.
///
/// Construct once and clone into consumers; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    stock: Arc<dyn StockGateway>,
    catalog: Arc<dyn CatalogGateway>,
    slot: CartSlot,
    notifier: Arc<dyn Notifier>,
    /// Committed cart; receivers observe every commit.
    state: watch::Sender<Cart>,
    /// Held for the whole of each mutation.
    mutation: Mutex<()>,
}

impl CartStore {
    /// Create a store, seeding the cart from `slot`.
    ///
    /// An absent or invalid persisted cart starts the store empty.
    pub fn new(
        stock: Arc<dyn StockGateway>,
        catalog: Arc<dyn CatalogGateway>,
        slot: CartSlot,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let initial = slot.load();
        info!(key = %slot.key(), lines = initial.len(), "Cart store initialized");
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(CartStoreInner {
                stock,
                catalog,
                slot,
                notifier,
                state,
                mutation: Mutex::new(()),
            }),
        }
    }

    /// Create a store talking to the configured API and persisting to the
    /// configured directory.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built.
    pub fn from_config(
        config: &CartConfig,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(&config.api)?);
        let slot = CartSlot::new(
            Arc::new(FileStore::new(&config.storage.dir)),
            config.storage.key.clone(),
        );
        Ok(Self::new(api.clone(), api, slot, notifier))
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is raised by one through
    /// [`update_product_amount`](Self::update_product_amount), including its
    /// stock check and notifications.
    ///
    /// # Errors
    ///
    /// - `CartError::InsufficientStock` if stock is at or below
    ///   [`ADD_STOCK_FLOOR`]
    /// - `CartError::Gateway` / `CartError::Storage` on transport or write
    ///   failure
    ///
    /// The cart is unchanged on error and the user has been notified.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartChange> {
        let _guard = self.inner.mutation.lock().await;

        match self.try_add(product_id).await {
            Ok(AddStep::Added) => {
                info!("Product added to cart");
                self.inner.notifier.notify(Notification::success(ADDED_MESSAGE));
                Ok(CartChange::Added(product_id))
            }
            Ok(AddStep::Increment(amount)) => {
                self.update_locked(AmountUpdate::new(product_id, amount))
                    .await
            }
            Err(e) => Err(self.reject(Operation::Add, e)),
        }
    }

    /// Remove the line for a product.
    ///
    /// # Errors
    ///
    /// - `CartError::LineNotFound` if the cart holds no such line
    /// - `CartError::Storage` if the write fails
    ///
    /// The cart is unchanged on error and the user has been notified.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartChange> {
        let _guard = self.inner.mutation.lock().await;

        let result = match self.cart().without(product_id) {
            Some(next) => self.commit(next).await,
            None => Err(CartError::LineNotFound(product_id)),
        };

        match result {
            Ok(()) => {
                info!("Product removed from cart");
                self.inner
                    .notifier
                    .notify(Notification::success(REMOVED_MESSAGE));
                Ok(CartChange::Removed(product_id))
            }
            Err(e) => Err(self.reject(Operation::Remove, e)),
        }
    }

    /// Set the amount held for a product.
    ///
    /// Succeeds silently. A product with no line leaves the cart as it is.
    ///
    /// # Errors
    ///
    /// - `CartError::InsufficientStock` unless `0 < amount <= stock`
    /// - `CartError::Gateway` / `CartError::Storage` on transport or write
    ///   failure
    ///
    /// The cart is unchanged on error and the user has been notified.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: AmountUpdate) -> Result<CartChange> {
        let _guard = self.inner.mutation.lock().await;
        self.update_locked(update).await
    }

    // =========================================================================
    // Steps (callers hold the mutation lock)
    // =========================================================================

    async fn try_add(&self, product_id: ProductId) -> Result<AddStep> {
        let stock = self.inner.stock.stock(product_id).await?;
        let cart = self.cart();
        let existing = cart.find(product_id).map(|line| line.amount);

        if stock.amount <= ADD_STOCK_FLOOR {
            return Err(CartError::InsufficientStock {
                product_id,
                requested: existing.map_or(1, |amount| amount.saturating_add(1)),
                available: stock.amount,
            });
        }

        if let Some(amount) = existing {
            return Ok(AddStep::Increment(amount.saturating_add(1)));
        }

        let product = self.inner.catalog.product(product_id).await?;
        if product.id != product_id {
            return Err(ApiError::UnexpectedProduct {
                requested: product_id,
                received: product.id,
            }
            .into());
        }

        self.commit(cart.with_line(CartLine::new(product, 1)))
            .await?;
        Ok(AddStep::Added)
    }

    async fn update_locked(&self, update: AmountUpdate) -> Result<CartChange> {
        match self.try_update(update).await {
            Ok(()) => {
                info!(amount = update.amount, "Product amount updated");
                Ok(CartChange::AmountUpdated {
                    product_id: update.product_id,
                    amount: update.amount,
                })
            }
            Err(e) => Err(self.reject(Operation::Update, e)),
        }
    }

    async fn try_update(&self, update: AmountUpdate) -> Result<()> {
        let stock = self.inner.stock.stock(update.product_id).await?;

        if !stock.covers(update.amount) {
            return Err(CartError::InsufficientStock {
                product_id: update.product_id,
                requested: update.amount,
                available: stock.amount,
            });
        }

        self.commit(self.cart().with_amount(update.product_id, update.amount))
            .await
    }

    /// Persist `next`, then make it the current cart.
    ///
    /// The write runs on the blocking pool; the mutation lock stays held
    /// until it lands.
    async fn commit(&self, next: Cart) -> Result<()> {
        let slot = self.inner.slot.clone();
        let next = tokio::task::spawn_blocking(move || slot.save(&next).map(|()| next))
            .await
            .map_err(|e| StorageError::Backend(format!("storage task failed: {e}")))??;
        self.inner.state.send_replace(next);
        Ok(())
    }

    /// Log and notify a failed operation, handing the error back.
    fn reject(&self, operation: Operation, error: CartError) -> CartError {
        if error.is_rejection() {
            warn!(?operation, error = %error, "Cart operation rejected");
        } else {
            tracing::error!(?operation, error = %error, "Cart operation failed");
        }
        self.inner
            .notifier
            .notify(Notification::error(error.user_message(operation)));
        error
    }
}

enum AddStep {
    Added,
    Increment(u32),
}
