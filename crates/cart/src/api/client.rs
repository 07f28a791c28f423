//! REST client for the storefront API.
//!
//! Uses `reqwest` for HTTP and caches catalog records with `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, StockInfo};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, CatalogGateway, StockGateway};
use crate::config::ApiConfig;

/// Longest slice of a response body kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// `None` when the configured TTL is zero.
    catalog: Option<Cache<ProductId, Product>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL cannot carry a path or the
    /// token is not a valid header value, and `ApiError::Http` if the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Config(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let catalog = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// Resolve `{base}/{resource}/{id}`, keeping any path prefix of the base.
    fn endpoint(&self, resource: &str, product_id: ProductId) -> Url {
        let mut url = self.inner.base_url.clone();
        // Checked in `new`: the base URL can carry a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(resource)
                .push(&product_id.to_string());
        }
        url
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl StockGateway for ApiClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, ApiError> {
        let stock: StockInfo = self.get_json(self.endpoint("stock", product_id)).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }
}

#[async_trait]
impl CatalogGateway for ApiClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        if let Some(cache) = &self.inner.catalog
            && let Some(product) = cache.get(&product_id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(self.endpoint("products", product_id)).await?;

        if let Some(cache) = &self.inner.catalog {
            cache.insert(product_id, product.clone()).await;
        }

        Ok(product)
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
