//! Staff and admin commands. The backend enforces roles; a shopper account
//! gets a 403 from every call here.

use bookbarn_core::{CategoryId, ProductId, StockDirection, UserId, UserRole};
use bookbarn_storefront::StorefrontContext;
use bookbarn_storefront::api::{
    CategoryRequest, CreateProductRequest, CreateStaffRequest, UpdateProductRequest,
};

use super::{CommandError, read_secret};
use crate::{ProductArgs, RegisterArgs, output};

pub async fn categories(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let categories = ctx.api().categories(&auth).await?;
    output::categories(&categories);
    Ok(())
}

pub async fn create_category(
    ctx: &StorefrontContext,
    name: String,
    category_type: String,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let request = CategoryRequest {
        name,
        product_category_type: category_type,
    };
    ctx.api().create_category(&auth, &request).await?;
    output::line(&format!("Created category {}.", request.name));
    Ok(())
}

pub async fn update_category(
    ctx: &StorefrontContext,
    id: CategoryId,
    name: String,
    category_type: String,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let request = CategoryRequest {
        name,
        product_category_type: category_type,
    };
    ctx.api().update_category(&auth, id, &request).await?;
    output::line(&format!("Updated category {id}."));
    Ok(())
}

pub async fn delete_category(ctx: &StorefrontContext, id: CategoryId) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    ctx.api().delete_category(&auth, id).await?;
    output::line(&format!("Deleted category {id}."));
    Ok(())
}

pub async fn stock(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let items = ctx.api().stock_levels(&auth).await?;
    output::stock(&items);
    Ok(())
}

pub async fn adjust_stock(
    ctx: &StorefrontContext,
    id: ProductId,
    direction: StockDirection,
    quantity: u32,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    ctx.api().adjust_stock(&auth, id, direction, quantity).await?;
    output::line(&format!(
        "Stock of product {id}: {} by {quantity}.",
        direction.path_segment()
    ));
    Ok(())
}

/// List products; `term` may be an id, a title, an ISBN or an author.
pub async fn products(ctx: &StorefrontContext, term: &str, page: u32) -> Result<(), CommandError> {
    let page = ctx.api().find_products(term, page).await?;
    output::products(&page, ctx.config().currency);
    Ok(())
}

pub async fn create_product(
    ctx: &StorefrontContext,
    args: ProductArgs,
    product_type: String,
    initial_stock: u32,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let request = CreateProductRequest {
        title: args.title,
        isbn: args.isbn,
        author: args.author,
        publisher: args.publisher,
        description: args.description,
        price: args.price,
        product_type,
        categories: args.categories,
        images: args.images,
        initial_stock,
    };
    ctx.api().create_product(&auth, &request).await?;
    output::line(&format!("Created product {}.", request.title));
    Ok(())
}

pub async fn update_product(
    ctx: &StorefrontContext,
    id: ProductId,
    args: ProductArgs,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let request = UpdateProductRequest {
        title: args.title,
        isbn: args.isbn,
        author: args.author,
        publisher: args.publisher,
        description: args.description,
        price: args.price,
        categories: args.categories,
        images: args.images,
    };
    ctx.api().update_product(&auth, id, &request).await?;
    output::line(&format!("Updated product {id}."));
    Ok(())
}

pub async fn delete_product(ctx: &StorefrontContext, id: ProductId) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    ctx.api().delete_product(&auth, id).await?;
    output::line(&format!("Deleted product {id}."));
    Ok(())
}

pub async fn users(ctx: &StorefrontContext, query: &str, page: u32) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let users = ctx.api().search_users(&auth, query, page).await?;
    output::users(&users);
    Ok(())
}

pub async fn create_staff(
    ctx: &StorefrontContext,
    args: RegisterArgs,
    role: UserRole,
) -> Result<(), CommandError> {
    if !role.is_backoffice() {
        return Err(CommandError::InvalidArgument(format!(
            "{role} is not a staff role"
        )));
    }
    let auth = ctx.require_session()?;
    let password = read_secret(args.password, "password")?;
    let request = CreateStaffRequest {
        name: args.name,
        surname: args.surname,
        born_date: args.born_date.format("%d/%m/%Y").to_string(),
        username: args.username,
        email: args.email,
        password,
        role,
    };
    ctx.api().create_staff(&auth, &request).await?;
    output::line(&format!("Created {} account {}.", request.role, request.username));
    Ok(())
}

pub async fn assign_role(
    ctx: &StorefrontContext,
    id: UserId,
    role: UserRole,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    ctx.api().assign_role(&auth, id, role.clone()).await?;
    output::line(&format!("User {id} is now {role}."));
    Ok(())
}
