//! Storefront API gateways.
//!
//! # Architecture
//!
//! - [`StockGateway`] and [`CatalogGateway`] are the seams the cart store
//!   depends on; tests substitute in-memory implementations
//! - [`ApiClient`] implements both over one `reqwest` client
//! - Stock is never cached; catalog records are cached via `moka`
//!
//! # Endpoints
//!
//! - `GET /stock/{id}` -> `{ "id": 1, "amount": 3 }`
//! - `GET /products/{id}` -> `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockInfo};
use thiserror::Error;

/// Errors that can occur when interacting with the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Catalog answered with a different product than requested.
    #[error("Catalog returned product {received} for product {requested}")]
    UnexpectedProduct {
        requested: ProductId,
        received: ProductId,
    },

    /// Client could not be constructed.
    #[error("Client configuration error: {0}")]
    Config(String),
}

/// Source of current stock levels.
#[async_trait]
pub trait StockGateway: Send + Sync {
    /// Fetch the available quantity for a product.
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, ApiError>;
}

/// Source of catalog records for new cart lines.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the display record for a product.
    async fn product(&self, product_id: ProductId) -> Result<Product, ApiError>;
}
