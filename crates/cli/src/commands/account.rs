//! Sign-in, registration, profile and address commands.

use std::path::Path;

use bookbarn_core::{AddressId, Email};
use bookbarn_storefront::StorefrontContext;
use bookbarn_storefront::api::{PostalAddress, RegisterRequest, UpdateProfileRequest};
use chrono::NaiveDate;

use super::{CommandError, read_secret};
use crate::{AddressArgs, RegisterArgs, output};

/// Sign in and persist the session.
pub async fn login(
    ctx: &StorefrontContext,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = read_secret(password, "password")?;
    let profile = ctx.login_with_credentials(username, &password).await?;
    output::line(&format!("Signed in as {} ({}).", profile.username, profile.role()));
    Ok(())
}

pub fn logout(ctx: &StorefrontContext) {
    if ctx.session().is_authenticated() {
        ctx.logout();
        output::line("Signed out.");
    } else {
        output::line("Not signed in.");
    }
}

pub async fn whoami(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let profile = ctx.api().user(&auth).await?;
    output::profile(&profile);
    Ok(())
}

pub async fn register(ctx: &StorefrontContext, args: RegisterArgs) -> Result<(), CommandError> {
    let password = read_secret(args.password, "password")?;
    let request = RegisterRequest {
        name: args.name,
        surname: args.surname,
        born_date: args.born_date,
        username: args.username,
        email: args.email,
        password,
    };
    ctx.api().register(&request).await?;
    output::line(&format!(
        "Account {} created. Sign in with `bookbarn login -u {}`.",
        request.email, request.username
    ));
    Ok(())
}

pub async fn forgot_password(ctx: &StorefrontContext, email: &Email) -> Result<(), CommandError> {
    ctx.api().forgot_password(email).await?;
    output::line(&format!("If {email} is registered, a reset link is on its way."));
    Ok(())
}

pub async fn reset_password(
    ctx: &StorefrontContext,
    token: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = read_secret(password, "new password")?;
    ctx.api().reset_password(token, &password).await?;
    output::line("Password updated.");
    Ok(())
}

pub async fn update_profile(
    ctx: &StorefrontContext,
    name: String,
    surname: String,
    born_date: NaiveDate,
    username: String,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let request = UpdateProfileRequest {
        name,
        surname,
        born_date: born_date.format("%d/%m/%Y").to_string(),
        username,
    };
    ctx.api().update_profile(&auth, &request).await?;
    output::line("Profile updated.");
    Ok(())
}

pub async fn update_phone(ctx: &StorefrontContext, number: &str) -> Result<(), CommandError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(CommandError::InvalidArgument(
            "phone number must not be empty".to_string(),
        ));
    }
    let auth = ctx.require_session()?;
    ctx.api().update_phone(&auth, number).await?;
    output::line("Phone number updated.");
    Ok(())
}

pub async fn update_avatar(ctx: &StorefrontContext, path: &Path) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CommandError::InvalidArgument(format!("not a file: {}", path.display())))?;
    let bytes = std::fs::read(path)?;
    ctx.api().update_avatar(&auth, file_name, bytes).await?;
    output::line("Avatar updated.");
    Ok(())
}

/// Delete the account, then forget the local session.
pub async fn delete_account(ctx: &StorefrontContext, yes: bool) -> Result<(), CommandError> {
    if !yes {
        return Err(CommandError::InvalidArgument(
            "account deletion is permanent; pass --yes to confirm".to_string(),
        ));
    }
    let auth = ctx.require_session()?;
    ctx.api().delete_account(&auth).await?;
    ctx.logout();
    output::line("Account deleted.");
    Ok(())
}

pub async fn addresses(ctx: &StorefrontContext) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let addresses = ctx.api().addresses(&auth).await?;
    output::addresses(&addresses);
    Ok(())
}

pub async fn add_address(ctx: &StorefrontContext, args: AddressArgs) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let address = ctx.api().add_address(&auth, &postal(args)).await?;
    output::line(&format!("Saved address {}.", address.id));
    Ok(())
}

pub async fn update_address(
    ctx: &StorefrontContext,
    id: AddressId,
    args: AddressArgs,
) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    let address = ctx.api().update_address(&auth, id, &postal(args)).await?;
    output::addresses(std::slice::from_ref(&address));
    Ok(())
}

pub async fn remove_address(ctx: &StorefrontContext, id: AddressId) -> Result<(), CommandError> {
    let auth = ctx.require_session()?;
    ctx.api().delete_address(&auth, id).await?;
    output::line(&format!("Removed address {id}."));
    Ok(())
}

fn postal(args: AddressArgs) -> PostalAddress {
    PostalAddress {
        name: args.name,
        street: args.street,
        city: args.city,
        province: args.province,
        country: args.country,
        postal_code: args.postal_code,
    }
}
