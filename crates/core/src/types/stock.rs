//! Stock levels as reported by the storefront API.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// Available quantity of a product (`GET /stock/{id}`).
///
/// Fetched on demand and never cached: stock changes underneath the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Product the stock level refers to.
    pub id: ProductId,
    /// Units available. The API may report zero or negative values.
    pub amount: i64,
}

impl StockInfo {
    /// Create a stock record.
    #[must_use]
    pub const fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be held in a cart.
    #[must_use]
    pub fn covers(&self, requested: u32) -> bool {
        requested > 0 && i64::from(requested) <= self.amount
    }
}
