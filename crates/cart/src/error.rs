//! Cart operation errors and their user-facing messages.
//!
//! Every operation returns `Result<CartChange, CartError>`. The store turns
//! an error into exactly one notification through
//! [`CartError::user_message`] before returning it.

use thiserror::Error;

use rocketshoes_core::ProductId;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Message shown when stock does not cover the request.
pub const INSUFFICIENT_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    /// Generic failure message for the operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::Update => "Failed to update product quantity",
        }
    }
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock does not cover the requested amount.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// No line for the product.
    #[error("Product {0} is not in the cart")]
    LineNotFound(ProductId),

    /// Storefront API call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] ApiError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Message shown to the user when `operation` fails with this error.
    ///
    /// Business-rule rejections get a specific message; transport and
    /// storage failures collapse into the operation's generic message.
    #[must_use]
    pub const fn user_message(&self, operation: Operation) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => INSUFFICIENT_STOCK_MESSAGE,
            Self::LineNotFound(_) | Self::Gateway(_) | Self::Storage(_) => {
                operation.failure_message()
            }
        }
    }

    /// Whether the error is a business-rule rejection rather than a failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InsufficientStock { .. } | Self::LineNotFound(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::InsufficientStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 1: requested 2, available 1"
        );

        let err = CartError::LineNotFound(ProductId::new(5));
        assert_eq!(err.to_string(), "Product 5 is not in the cart");
    }

    #[test]
    fn test_user_messages() {
        let stock = CartError::InsufficientStock {
            product_id: ProductId::new(1),
            requested: 1,
            available: 0,
        };
        assert_eq!(stock.user_message(Operation::Add), INSUFFICIENT_STOCK_MESSAGE);
        assert_eq!(stock.user_message(Operation::Update), INSUFFICIENT_STOCK_MESSAGE);

        let missing = CartError::LineNotFound(ProductId::new(1));
        assert_eq!(missing.user_message(Operation::Remove), "Failed to remove product");

        let gateway = CartError::Gateway(ApiError::RateLimited(1));
        assert_eq!(gateway.user_message(Operation::Add), "Failed to add product");
        assert_eq!(
            gateway.user_message(Operation::Update),
            "Failed to update product quantity"
        );
    }

    #[test]
    fn test_is_rejection() {
        assert!(CartError::LineNotFound(ProductId::new(1)).is_rejection());
        assert!(!CartError::Gateway(ApiError::NotFound("x".to_string())).is_rejection());
    }
}
