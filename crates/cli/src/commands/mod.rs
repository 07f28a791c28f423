//! Cart command output.
//!
//! Commands print the cart to stdout and notifications to stderr, so the
//! cart listing can be piped on its own.

use rocketshoes_cart::api::ApiError;
use rocketshoes_cart::notify::{Notification, Severity};
use rocketshoes_cart::{CartError, CartStore};
use rocketshoes_core::{Cart, format_price};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The API client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The cart operation was rejected or failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// Print the current cart.
#[allow(clippy::print_stdout)]
pub fn show(store: &CartStore) {
    for line in render(&store.cart()) {
        println!("{line}");
    }
}

/// Print every queued notification.
#[allow(clippy::print_stderr)]
pub fn print_notifications(notifications: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        eprintln!("{}", format_notification(&notification));
    }
}

fn format_notification(notification: &Notification) -> String {
    let marker = match notification.severity {
        Severity::Success => "ok",
        Severity::Error => "error",
        Severity::Info => "info",
    };
    format!("[{marker}] {}", notification.message)
}

/// Render a cart as aligned text lines.
fn render(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut out: Vec<String> = cart
        .iter()
        .map(|line| {
            format!(
                "{:>5}  {:<40} {:>4} x {:>10} = {:>10}",
                line.product_id().as_i32(),
                line.product.title,
                line.amount,
                format_price(line.product.price),
                format_price(line.line_total()),
            )
        })
        .collect();

    out.push(format!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        format_price(cart.subtotal())
    ));
    out
}

#[cfg(test)]
mod tests {
    use rocketshoes_core::{CartLine, Product, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&Cart::new()), vec!["Cart is empty".to_string()]);
    }

    #[test]
    fn test_render_lines_and_subtotal() {
        let cart = Cart::from_lines(vec![
            CartLine::new(
                Product::new(ProductId::new(1), "Shoe", Decimal::new(17990, 2)),
                2,
            ),
            CartLine::new(
                Product::new(ProductId::new(2), "Boot", Decimal::new(5000, 2)),
                1,
            ),
        ]);

        let lines = render(&cart);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Shoe"));
        assert!(lines[0].contains("$179.90"));
        assert!(lines[0].contains("$359.80"));
        assert_eq!(lines[2], "3 item(s), subtotal $409.80");
    }

    #[test]
    fn test_format_notification() {
        assert_eq!(
            format_notification(&Notification::success("Product added to cart")),
            "[ok] Product added to cart"
        );
        assert_eq!(
            format_notification(&Notification::error("Failed to add product")),
            "[error] Failed to add product"
        );
    }
}
