//! Catalog records as served by the storefront API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product as returned by the catalog (`GET /products/{id}`).
///
/// Only the fields the cart displays are kept. `title` also accepts the
/// `name` key, and `price`/`image` fall back to defaults when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    #[serde(alias = "name")]
    pub title: String,
    /// Unit price in the store currency.
    #[serde(default)]
    pub price: Decimal,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Create a product record with no image.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: None,
        }
    }
}

/// Format an amount as a dollar price string (e.g. `$179.90`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_record() {
        let json = r#"{"id": 1, "title": "Tênis de Caminhada", "price": 179.9, "image": "https://cdn/shoe.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.title, "Tênis de Caminhada");
        assert_eq!(product.price, Decimal::new(1799, 1));
        assert_eq!(product.image.as_deref(), Some("https://cdn/shoe.jpg"));
    }

    #[test]
    fn test_deserialize_name_alias_and_defaults() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "Shoe"}"#).unwrap();
        assert_eq!(product.title, "Shoe");
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.image.is_none());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(1799, 1)), "$179.90");
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
        assert_eq!(format_price(Decimal::new(10_005, 3)), "$10.00");
    }
}
