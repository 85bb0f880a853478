//! Terminal rendering of command results.

#![allow(clippy::print_stdout)]

use bookbarn_core::CurrencyCode;
use bookbarn_storefront::api::{
    Address, BackofficeUser, Cart, Category, InventoryItem, Order, OrderDetail, Page, PostalAddress,
    Product, UserProfile, Wishlist,
};
use bookbarn_storefront::{CheckoutReceipt, StoreSnapshot};

pub fn line(message: &str) {
    println!("{message}");
}

pub fn profile(profile: &UserProfile) {
    println!("{} {} (@{})", profile.name, profile.surname, profile.username);
    println!("  id:     {}", profile.id);
    println!("  email:  {}", profile.email);
    println!("  role:   {}", profile.role());
    if let Some(born) = &profile.born_date {
        println!("  born:   {born}");
    }
    println!("  phone:  {}", profile.phone_number.as_deref().unwrap_or("-"));
    if let Some(avatar) = &profile.avatar_url {
        println!("  avatar: {avatar}");
    }
}

pub fn cart(snapshot: &StoreSnapshot<Cart>, currency: CurrencyCode) {
    let Some(cart) = snapshot.data.as_ref().filter(|c| !c.items.is_empty()) else {
        println!("Cart is empty.");
        return;
    };

    for item in &cart.items {
        println!(
            "{:>6}  {:<40} {:>3} x {:>10} = {:>10}",
            item.product_id,
            truncate(&item.title, 40),
            item.quantity,
            currency.format(item.price),
            currency.format(item.line_total()),
        );
    }
    println!("{} item(s), total {}", cart.item_count(), currency.format(cart.total_price));
}

pub fn wishlist(snapshot: &StoreSnapshot<Wishlist>, currency: CurrencyCode) {
    let Some(wishlist) = snapshot.data.as_ref().filter(|w| !w.items.is_empty()) else {
        println!("Wishlist is empty.");
        return;
    };

    for item in &wishlist.items {
        println!(
            "{:>6}  {:<40} {:>10}",
            item.product_id,
            truncate(&item.product_name, 40),
            currency.format(item.price),
        );
    }
}

pub fn products(page: &Page<Product>, currency: CurrencyCode) {
    if page.content.is_empty() {
        println!("No products found.");
        return;
    }
    for product in &page.content {
        println!(
            "{:>6}  {:<40} {:<24} {:>10}",
            product.id,
            truncate(&product.title, 40),
            truncate(&product.author.join(", "), 24),
            currency.format(product.price),
        );
    }
    pagination(page);
}

pub fn product(product: &Product, currency: CurrencyCode) {
    println!("{} ({})", product.title, currency.format(product.price));
    println!("  id:       {}", product.id);
    if !product.author.is_empty() {
        println!("  author:   {}", product.author.join(", "));
    }
    if let Some(isbn) = &product.isbn {
        println!("  isbn:     {isbn}");
    }
    if let Some(category) = &product.category {
        println!("  category: {category}");
    }
    for paragraph in &product.description {
        println!();
        println!("{paragraph}");
    }
}

pub fn orders(orders: &[Order], currency: CurrencyCode) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        println!(
            "#{:<6} {:<20} {:<10} {:>10}",
            order.order_id,
            order.order_date,
            order.order_status,
            currency.format(order.total_amount),
        );
    }
}

pub fn order(order: &OrderDetail, currency: CurrencyCode) {
    println!("Order #{} - {} - {}", order.order_id, order.order_date, order.order_status);
    for item in &order.items {
        let price = item
            .effective_price()
            .map_or_else(|| "-".to_string(), |p| currency.format(p));
        println!(
            "  {:<40} {:>3} x {:>10}",
            truncate(&item.product_name, 40),
            item.quantity,
            price
        );
    }
    println!("Total: {}", currency.format(order.total_amount));
    println!("Ship to: {}", postal(&order.shipping_address));
    if let Some(billing) = &order.billing_address {
        println!("Bill to: {}", postal(billing));
    }
}

pub fn addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        println!("No saved addresses.");
        return;
    }
    for address in addresses {
        println!("{:>4}  {}", address.id, postal(&address.postal));
    }
}

pub fn receipt(receipt: &CheckoutReceipt) {
    println!(
        "Order #{} placed for {}.",
        receipt.order_id,
        receipt.currency.format(receipt.amount)
    );
    println!("Payment client secret: {}", receipt.payment.client_secret);
}

pub fn categories(categories: &[Category]) {
    for category in categories {
        println!(
            "{:>4}  {:<30} {}",
            category.id, category.name, category.product_category_type
        );
    }
}

pub fn stock(items: &[InventoryItem]) {
    for item in items {
        println!("{:>6}  {:<40} {:>6}", item.product_id, truncate(&item.title, 40), item.quantity);
    }
}

pub fn users(page: &Page<BackofficeUser>) {
    for user in &page.content {
        println!(
            "{:>6}  {:<20} {:<30} {}",
            user.id, user.username, user.email, user.role
        );
    }
    pagination(page);
}

fn pagination<T>(page: &Page<T>) {
    if page.total_pages > 1 {
        println!("Page {} of {}", page.number + 1, page.total_pages);
    }
}

fn postal(address: &PostalAddress) -> String {
    format!(
        "{}, {}, {} {} ({}), {}",
        address.name, address.street, address.postal_code, address.city, address.province, address.country
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
