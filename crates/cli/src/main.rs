//! Bookbarn CLI - storefront and backoffice from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password read from BOOKBARN_PASSWORD or stdin)
//! bookbarn login -u reader
//!
//! # Browse and shop
//! bookbarn products search dune
//! bookbarn cart add 7 -q 2
//! bookbarn cart view
//! bookbarn checkout --shipping 3
//!
//! # Backoffice
//! bookbarn backoffice stock increase 7 10
//! bookbarn backoffice users assign-role 9 STAFF
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `register`, `forgot-password`, `reset-password`
//! - `products` - search and show catalog entries
//! - `cart`, `wishlist` - manage the signed-in user's collections
//! - `orders`, `checkout` - order history and placing orders
//! - `profile`, `addresses` - account details
//! - `backoffice` - categories, stock, products and staff

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bookbarn_core::{AddressId, CategoryId, Email, OrderId, ProductId, UserId, UserRole};
use bookbarn_storefront::{ClientConfig, StorefrontContext};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "bookbarn")]
#[command(author, version, about = "Bookbarn bookstore client")]
struct Cli {
    /// Log debug output from the client
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Password; read from stdin when absent
        #[arg(long, env = "BOOKBARN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create a shopper account
    Register(RegisterArgs),
    /// Email a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: Email,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(short, long)]
        token: String,
        /// New password; read from stdin when absent
        #[arg(long, env = "BOOKBARN_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Place an order for the cart and open a payment intent
    Checkout {
        /// Shipping address id
        #[arg(long)]
        shipping: AddressId,
        /// Billing address id (defaults to shipping)
        #[arg(long)]
        billing: Option<AddressId>,
    },
    /// Account details
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Staff and admin tools
    Backoffice {
        #[command(subcommand)]
        area: BackofficeArea,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    surname: String,
    /// Birth date as YYYY-MM-DD
    #[arg(long)]
    born_date: NaiveDate,
    #[arg(short, long)]
    username: String,
    #[arg(short, long)]
    email: Email,
    /// Password; read from stdin when absent
    #[arg(long, env = "BOOKBARN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum ProductAction {
    /// Search by title
    Search {
        /// Title to search for; omit to list everything
        title: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    View,
    /// Add a product
    Add {
        id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity
    Update { id: ProductId, quantity: u32 },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    View,
    /// Add a product
    Add { id: ProductId },
    /// Remove a product
    Remove { id: ProductId },
    /// Add the product if absent, remove it if present
    Toggle { id: ProductId },
    /// Empty the wishlist
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders
    List,
    /// Show one order
    Show { id: OrderId },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Update name, surname, birth date and username
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        born_date: NaiveDate,
        #[arg(short, long)]
        username: String,
    },
    /// Set the phone number
    Phone { number: String },
    /// Upload an avatar image
    Avatar { path: PathBuf },
    /// Delete the account and sign out
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddressArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    province: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    postal_code: String,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
    /// Replace a saved address
    Update {
        id: AddressId,
        #[command(flatten)]
        address: AddressArgs,
    },
    /// Delete a saved address
    Remove { id: AddressId },
}

#[derive(Subcommand)]
enum BackofficeArea {
    /// Product categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Stock levels
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Catalog administration
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// User and staff administration
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    List,
    Create {
        name: String,
        /// Category type, e.g. BOOK
        #[arg(short = 't', long = "type")]
        category_type: String,
    },
    Update {
        id: CategoryId,
        name: String,
        #[arg(short = 't', long = "type")]
        category_type: String,
    },
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum StockAction {
    List,
    Increase { id: ProductId, quantity: u32 },
    Decrease { id: ProductId, quantity: u32 },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    author: String,
    #[arg(long, default_value = "")]
    publisher: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: Decimal,
    /// Comma-separated category names
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
    /// Comma-separated image URLs
    #[arg(long, value_delimiter = ',')]
    images: Vec<String>,
}

#[derive(Subcommand)]
enum AdminProductAction {
    /// List products; an all-digit term looks up that id
    List {
        term: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    Create {
        #[command(flatten)]
        product: ProductArgs,
        #[arg(long = "type", default_value = "BOOK")]
        product_type: String,
        #[arg(long, default_value_t = 0)]
        initial_stock: u32,
    },
    Update {
        id: ProductId,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum UserAction {
    /// Search users
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// Create a staff account
    CreateStaff {
        #[command(flatten)]
        account: RegisterArgs,
        #[arg(long, default_value = "STAFF")]
        role: UserRole,
    },
    /// Change a user's role
    AssignRole { id: UserId, role: UserRole },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ClientConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let default_filter = if cli.verbose {
        "bookbarn_storefront=debug,bookbarn=debug"
    } else {
        "bookbarn_storefront=info,bookbarn=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = StorefrontContext::new(config).await?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(&ctx, &username, password).await?;
        }
        Commands::Logout => commands::account::logout(&ctx),
        Commands::Whoami => commands::account::whoami(&ctx).await?,
        Commands::Register(args) => commands::account::register(&ctx, args).await?,
        Commands::ForgotPassword { email } => commands::account::forgot_password(&ctx, &email).await?,
        Commands::ResetPassword { token, password } => {
            commands::account::reset_password(&ctx, &token, password).await?;
        }
        Commands::Products { action } => match action {
            ProductAction::Search { title, page } => {
                commands::shop::search(&ctx, title, page).await?;
            }
            ProductAction::Show { id } => commands::shop::show_product(&ctx, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::View => commands::shop::cart_view(&ctx)?,
            CartAction::Add { id, quantity } => commands::shop::cart_add(&ctx, id, quantity).await?,
            CartAction::Update { id, quantity } => {
                commands::shop::cart_update(&ctx, id, quantity).await?;
            }
            CartAction::Remove { id } => commands::shop::cart_remove(&ctx, id).await?,
            CartAction::Clear => commands::shop::cart_clear(&ctx).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::View => commands::shop::wishlist_view(&ctx)?,
            WishlistAction::Add { id } => commands::shop::wishlist_add(&ctx, id).await?,
            WishlistAction::Remove { id } => commands::shop::wishlist_remove(&ctx, id).await?,
            WishlistAction::Toggle { id } => commands::shop::wishlist_toggle(&ctx, id).await?,
            WishlistAction::Clear => commands::shop::wishlist_clear(&ctx).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List => commands::shop::orders(&ctx).await?,
            OrderAction::Show { id } => commands::shop::order(&ctx, id).await?,
        },
        Commands::Checkout { shipping, billing } => {
            commands::shop::checkout(&ctx, shipping, billing).await?;
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::whoami(&ctx).await?,
            ProfileAction::Update {
                name,
                surname,
                born_date,
                username,
            } => {
                commands::account::update_profile(&ctx, name, surname, born_date, username).await?;
            }
            ProfileAction::Phone { number } => commands::account::update_phone(&ctx, &number).await?,
            ProfileAction::Avatar { path } => commands::account::update_avatar(&ctx, &path).await?,
            ProfileAction::Delete { yes } => commands::account::delete_account(&ctx, yes).await?,
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::account::addresses(&ctx).await?,
            AddressAction::Add(address) => commands::account::add_address(&ctx, address).await?,
            AddressAction::Update { id, address } => {
                commands::account::update_address(&ctx, id, address).await?;
            }
            AddressAction::Remove { id } => commands::account::remove_address(&ctx, id).await?,
        },
        Commands::Backoffice { area } => match area {
            BackofficeArea::Categories { action } => match action {
                CategoryAction::List => commands::backoffice::categories(&ctx).await?,
                CategoryAction::Create {
                    name,
                    category_type,
                } => commands::backoffice::create_category(&ctx, name, category_type).await?,
                CategoryAction::Update {
                    id,
                    name,
                    category_type,
                } => commands::backoffice::update_category(&ctx, id, name, category_type).await?,
                CategoryAction::Delete { id } => commands::backoffice::delete_category(&ctx, id).await?,
            },
            BackofficeArea::Stock { action } => match action {
                StockAction::List => commands::backoffice::stock(&ctx).await?,
                StockAction::Increase { id, quantity } => {
                    commands::backoffice::adjust_stock(&ctx, id, bookbarn_core::StockDirection::Increase, quantity)
                        .await?;
                }
                StockAction::Decrease { id, quantity } => {
                    commands::backoffice::adjust_stock(&ctx, id, bookbarn_core::StockDirection::Decrease, quantity)
                        .await?;
                }
            },
            BackofficeArea::Products { action } => match action {
                AdminProductAction::List { term, page } => {
                    commands::backoffice::products(&ctx, term.as_deref().unwrap_or(""), page).await?;
                }
                AdminProductAction::Create {
                    product,
                    product_type,
                    initial_stock,
                } => {
                    commands::backoffice::create_product(&ctx, product, product_type, initial_stock).await?;
                }
                AdminProductAction::Update { id, product } => {
                    commands::backoffice::update_product(&ctx, id, product).await?;
                }
                AdminProductAction::Delete { id } => commands::backoffice::delete_product(&ctx, id).await?,
            },
            BackofficeArea::Users { action } => match action {
                UserAction::Search { query, page } => {
                    commands::backoffice::users(&ctx, &query, page).await?;
                }
                UserAction::CreateStaff { account, role } => {
                    commands::backoffice::create_staff(&ctx, account, role).await?;
                }
                UserAction::AssignRole { id, role } => {
                    commands::backoffice::assign_role(&ctx, id, role).await?;
                }
            },
        },
    }
    Ok(())
}
