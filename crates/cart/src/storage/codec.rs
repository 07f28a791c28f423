//! Versioned encoding of the persisted cart.
//!
//! # Layout
//!
//! Version 1 wraps the lines in an envelope:
//!
//! ```json
//! { "version": 1, "lines": [ { "id": 1, "title": "Shoe", "price": "179.90", "amount": 2 } ] }
//! ```
//!
//! Unversioned data (a bare JSON array of lines) is still accepted and
//! read as version 1. Anything else is rejected, as are lines with a zero
//! amount and carts holding two lines for the same product.

use std::collections::HashSet;

use rocketshoes_core::{Cart, CartLine, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version written by [`encode`].
pub const CURRENT_VERSION: u64 = 1;

/// Errors raised while decoding a persisted cart.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not valid JSON, or lines of the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither a versioned envelope nor a bare list of lines.
    #[error("Unrecognized cart layout")]
    UnrecognizedLayout,

    /// Written by a newer (or unknown) version.
    #[error("Unsupported cart version {0}")]
    UnsupportedVersion(u64),

    /// A line holds no units.
    #[error("Line for product {0} has a zero amount")]
    ZeroAmount(ProductId),

    /// Two lines for the same product.
    #[error("Duplicate line for product {0}")]
    DuplicateProduct(ProductId),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u64,
    lines: &'a [CartLine],
}

#[derive(Deserialize)]
struct Envelope {
    version: u64,
    lines: serde_json::Value,
}

/// Encode a cart at [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns `CodecError::Json` if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: CURRENT_VERSION,
        lines: cart.lines(),
    })?)
}

/// Decode and validate a persisted cart.
///
/// # Errors
///
/// Returns `CodecError` if the text is malformed, from an unsupported
/// version, or breaks a cart invariant.
pub fn decode(raw: &str) -> Result<Cart, CodecError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let lines: Vec<CartLine> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(ref map) if map.contains_key("version") => {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.version != CURRENT_VERSION {
                return Err(CodecError::UnsupportedVersion(envelope.version));
            }
            serde_json::from_value(envelope.lines)?
        }
        _ => return Err(CodecError::UnrecognizedLayout),
    };

    validate(&lines)?;
    Ok(Cart::from_lines(lines))
}

fn validate(lines: &[CartLine]) -> Result<(), CodecError> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.amount == 0 {
            return Err(CodecError::ZeroAmount(line.product_id()));
        }
        if !seen.insert(line.product_id()) {
            return Err(CodecError::DuplicateProduct(line.product_id()));
        }
    }
    Ok(())
}
