//! Terminal rendering for command results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use rust_decimal::Decimal;
use shopfront_core::{CartLine, CartTotals, Product, format_amount};
use shopfront_storefront::notify::{Notification, NotificationLevel};

/// Print a one-line listing for each product.
pub fn product_list(currency: &str, products: &[&Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        let badge = if product.bestseller { " *" } else { "" };
        println!(
            "{:<26} {:>12}  {}{badge}",
            product.id,
            format_amount(currency, product.price),
            product.name
        );
    }
}

/// Print the full details of one product.
pub fn product_detail(currency: &str, product: &Product) {
    println!("{}", product.name);
    println!("  id:       {}", product.id);
    println!("  price:    {}", format_amount(currency, product.price));
    if !product.category.is_empty() {
        println!("  category: {} / {}", product.category, product.sub_category);
    }
    if !product.sizes.is_empty() {
        println!("  sizes:    {}", product.sizes.join(", "));
    }
    if let Some(image) = product.thumbnail() {
        println!("  image:    {image}");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

/// Print cart lines followed by the checkout totals.
pub fn cart(currency: &str, lines: &[CartLine], unlisted: u64, totals: &CartTotals) {
    if lines.is_empty() && unlisted == 0 {
        println!("Your cart is empty.");
        return;
    }
    for line in lines {
        println!(
            "{:<30} {:>4} x{:<3} {:>12}",
            line.product.name,
            line.size,
            line.quantity,
            format_amount(currency, line.line_total())
        );
    }
    if unlisted > 0 {
        println!("({unlisted} item(s) no longer listed)");
    }
    println!();
    amount_row("Subtotal", currency, totals.subtotal);
    amount_row("Shipping Fee", currency, totals.shipping);
    amount_row("Total", currency, totals.total);
}

fn amount_row(label: &str, currency: &str, amount: Decimal) {
    println!("{label:<40} {:>12}", format_amount(currency, amount));
}

/// Print a plain status line.
pub fn line(message: &str) {
    println!("{message}");
}

/// Render notifications as toast-style lines on stderr.
pub fn notifications(notifications: &[Notification]) {
    for n in notifications {
        let marker = match n.level {
            NotificationLevel::Success => "✔",
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Error => "✖",
        };
        eprintln!("{marker} {}", n.message);
    }
}

/// Report an error that happens before logging is set up.
pub fn fatal(message: &str) {
    eprintln!("{message}");
}
