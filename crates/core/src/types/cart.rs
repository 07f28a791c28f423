//! Cart lines and the cart itself.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLine`]s holding at most
//! one line per product. The transition helpers (`with_line`, `with_amount`,
//! `without`) never mutate in place; they return the next cart so the caller
//! can persist it before committing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// One product entry in the cart with a quantity.
///
/// Serialized flat: the catalog fields sit next to `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog data captured when the line was created.
    #[serde(flatten)]
    pub product: Product,
    /// Units held, always positive.
    pub amount: u32,
}

impl CartLine {
    /// Create a line holding `amount` units of `product`.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// Product identifier of this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price multiplied by the amount held.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.amount)
    }
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, keeping their order.
    ///
    /// Does not check product uniqueness; callers that load untrusted data
    /// must validate first.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.amount)).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The next cart with `line` appended at the end.
    #[must_use]
    pub fn with_line(&self, line: CartLine) -> Self {
        let mut lines = self.lines.clone();
        lines.push(line);
        Self { lines }
    }

    /// The next cart with the amount of `product_id` replaced.
    ///
    /// Other lines are copied unchanged and order is preserved. A product
    /// without a line leaves the cart as it is.
    #[must_use]
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Self {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                if line.product_id() == product_id {
                    CartLine {
                        amount,
                        ..line.clone()
                    }
                } else {
                    line.clone()
                }
            })
            .collect();
        Self { lines }
    }

    /// The next cart without the line for `product_id`, or `None` if the
    /// cart holds no such line.
    #[must_use]
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        let index = self
            .lines
            .iter()
            .position(|line| line.product_id() == product_id)?;
        let mut lines = self.lines.clone();
        lines.remove(index);
        Some(Self { lines })
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
