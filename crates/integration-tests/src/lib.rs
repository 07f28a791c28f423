//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: the storefront API is served by a
//! `mockito` server and the cart is persisted under a temporary directory.
//!
//! # Test Categories
//!
//! - `cart_api` - Store operations against the HTTP API
//! - `persistence` - Reloading carts from disk, legacy and corrupt data

use std::sync::Arc;

use mockito::{Mock, ServerGuard};
use rocketshoes_cart::notify::{ChannelNotifier, Notification};
use rocketshoes_cart::storage::FileStore;
use rocketshoes_cart::{CartConfig, CartStore};
use rocketshoes_core::ProductId;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// A cart store wired to a mock API and a temporary storage directory.
pub struct TestContext {
    pub server: ServerGuard,
    pub storage: TempDir,
    pub config: CartConfig,
    pub store: CartStore,
    pub notifications: UnboundedReceiver<Notification>,
}

impl TestContext {
    /// Start a mock API and open an empty cart.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the store cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn new() -> Self {
        let server = mockito::Server::new_async().await;
        let storage = tempfile::tempdir().expect("Failed to create temp dir");

        let api_url = server.url();
        let storage_dir = storage.path().display().to_string();
        let config = CartConfig::from_lookup(|key| match key {
            "CART_API_URL" => Some(api_url.clone()),
            "CART_STORAGE_DIR" => Some(storage_dir.clone()),
            "CART_HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("Failed to build test configuration");

        let (store, notifications) = open_store(&config);

        Self {
            server,
            storage,
            config,
            store,
            notifications,
        }
    }

    /// Open a second store on the same API and storage, as a new session would.
    #[must_use]
    pub fn reopen(&self) -> (CartStore, UnboundedReceiver<Notification>) {
        open_store(&self.config)
    }

    /// File store backing the cart.
    #[must_use]
    pub fn file_store(&self) -> FileStore {
        FileStore::new(self.storage.path())
    }

    /// Serve `GET /stock/{id}`.
    pub async fn mock_stock(&mut self, id: i32, amount: i64) -> Mock {
        self.server
            .mock("GET", format!("/stock/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"id": {id}, "amount": {amount}}}"#))
            .create_async()
            .await
    }

    /// Serve `GET /products/{id}`.
    pub async fn mock_product(&mut self, id: i32, title: &str, price: &str) -> Mock {
        self.server
            .mock("GET", format!("/products/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"id": {id}, "title": "{title}", "price": {price}, "image": "https://cdn.rocketshoes.dev/{id}.jpg"}}"#
            ))
            .create_async()
            .await
    }

    /// Notifications emitted so far.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            out.push(notification);
        }
        out
    }

    /// Amount held for a product, if it has a line.
    #[must_use]
    pub fn amount_of(&self, id: i32) -> Option<u32> {
        self.store.cart().find(ProductId::new(id)).map(|line| line.amount)
    }
}

#[allow(clippy::expect_used)]
fn open_store(config: &CartConfig) -> (CartStore, UnboundedReceiver<Notification>) {
    let (notifier, notifications) = ChannelNotifier::new();
    let store =
        CartStore::from_config(config, Arc::new(notifier)).expect("Failed to create cart store");
    (store, notifications)
}
