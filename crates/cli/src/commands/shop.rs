//! Catalog, cart, wishlist, order and checkout commands.

use bookbarn_core::{AddressId, OrderId, ProductId};
use bookbarn_storefront::api::ProductSearch;
use bookbarn_storefront::{CartStore, StorefrontContext, WishlistStore};

use super::{CommandError, check, fetched};
use crate::output;

fn cart_store(ctx: &StorefrontContext) -> Result<CartStore, CommandError> {
    ctx.cart().ok_or(CommandError::NotSignedIn)
}

fn wishlist_store(ctx: &StorefrontContext) -> Result<WishlistStore, CommandError> {
    ctx.wishlist().ok_or(CommandError::NotSignedIn)
}

// =============================================================================
// Catalog
// =============================================================================

pub async fn search(
    ctx: &StorefrontContext,
    title: Option<String>,
    page: u32,
) -> Result<(), CommandError> {
    let search = title
        .filter(|t| !t.trim().is_empty())
        .map_or_else(ProductSearch::default, ProductSearch::by_title)
        .page(page);
    let results = ctx.api().search_products(&search).await?;
    output::products(&results, ctx.config().currency);
    Ok(())
}

pub async fn show_product(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let product = ctx.api().product(id).await?;
    output::product(&product, ctx.config().currency);
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// Print the cart fetched when the session was restored.
pub fn cart_view(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let snapshot = cart_store(ctx)?.snapshot();
    fetched(&snapshot)?;
    output::cart(&snapshot, ctx.config().currency);
    Ok(())
}

pub async fn cart_add(
    ctx: &StorefrontContext,
    id: ProductId,
    quantity: u32,
) -> Result<(), CommandError> {
    if quantity == 0 {
        return Err(CommandError::InvalidArgument(
            "quantity must be at least 1".to_string(),
        ));
    }
    let store = cart_store(ctx)?;
    check(store.add(id, quantity).await)?;
    output::cart(&store.snapshot(), ctx.config().currency);
    Ok(())
}

pub async fn cart_update(
    ctx: &StorefrontContext,
    id: ProductId,
    quantity: u32,
) -> Result<(), CommandError> {
    let store = cart_store(ctx)?;
    check(store.update_quantity(id, quantity).await)?;
    output::cart(&store.snapshot(), ctx.config().currency);
    Ok(())
}

pub async fn cart_remove(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let store = cart_store(ctx)?;
    check(store.remove(id).await)?;
    output::cart(&store.snapshot(), ctx.config().currency);
    Ok(())
}

pub async fn cart_clear(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let store = cart_store(ctx)?;
    check(store.clear().await)?;
    output::line("Cart cleared.");
    Ok(())
}

// =============================================================================
// Wishlist
// =============================================================================

pub fn wishlist_view(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let snapshot = wishlist_store(ctx)?.snapshot();
    fetched(&snapshot)?;
    output::wishlist(&snapshot, ctx.config().currency);
    Ok(())
}

pub async fn wishlist_add(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let store = wishlist_store(ctx)?;
    check(store.add(id).await)?;
    output::wishlist(&store.snapshot(), ctx.config().currency);
    Ok(())
}

pub async fn wishlist_remove(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let store = wishlist_store(ctx)?;
    check(store.remove(id).await)?;
    output::wishlist(&store.snapshot(), ctx.config().currency);
    Ok(())
}

/// Toggle membership against the wishlist fetched when the session was
/// restored.
pub async fn wishlist_toggle(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let store = wishlist_store(ctx)?;
    fetched(&store.snapshot())?;
    check(store.toggle(id).await)?;

    let verb = if store.contains(id) { "Added" } else { "Removed" };
    output::line(&format!("{verb} product {id}."));
    Ok(())
}

pub async fn wishlist_clear(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let store = wishlist_store(ctx)?;
    check(store.clear().await)?;
    output::line("Wishlist cleared.");
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

pub async fn orders(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let orders = ctx.api().orders(&auth).await?;
    output::orders(&orders, ctx.config().currency);
    Ok(())
}

pub async fn order(ctx: &StorefrontContext, id: OrderId) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let order = ctx.api().order(&auth, id).await?;
    output::order(&order, ctx.config().currency);
    Ok(())
}

pub async fn checkout(
    ctx: &StorefrontContext,
    shipping: AddressId,
    billing: Option<AddressId>,
) -> Result<(), CommandError> {
    let receipt = ctx.checkout(shipping, billing).await?;
    output::receipt(&receipt);
    Ok(())
}
