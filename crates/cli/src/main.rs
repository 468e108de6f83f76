//! Bazaar CLI - drive the marketplace client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bz products --category Books --sort price_low
//!
//! # Work with a cart (password from BAZAAR_PASSWORD)
//! bz cart --email ada@example.com show
//! bz cart --email ada@example.com add <product-id> --quantity 2
//!
//! # Dashboards
//! bz dashboard --email seller@example.com seller
//!
//! # Offline helpers
//! bz pricing discount 100 75
//! bz sku
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Browse listings
//! - `cart` - Show and edit the signed-in customer's cart
//! - `wishlist` - Show and edit the signed-in customer's wishlist
//! - `dashboard` - Seller and admin figures
//! - `pricing` - Commission and discount arithmetic
//! - `sku` - Generate a SKU

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::{CartLineId, ProductId, VariantId, WishlistEntryId};
use bazaar_storefront::BackendConfig;
use bazaar_storefront::models::ProductSort;

mod commands;

#[derive(Parser)]
#[command(name = "bz")]
#[command(author, version, about = "Bazaar marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Minimum list price (inclusive)
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum list price (inclusive)
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Sort order (`newest`, `price_low`, `price_high`, `rating`)
        #[arg(short, long, default_value = "newest")]
        sort: ProductSort,
    },
    /// Show one product
    Product {
        id: ProductId,
    },
    /// Manage the signed-in customer's cart
    Cart {
        /// Account email; the password is read from `BAZAAR_PASSWORD`
        #[arg(short, long, env = "BAZAAR_EMAIL")]
        email: String,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the signed-in customer's wishlist
    Wishlist {
        /// Account email; the password is read from `BAZAAR_PASSWORD`
        #[arg(short, long, env = "BAZAAR_EMAIL")]
        email: String,

        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Show dashboard figures
    Dashboard {
        /// Account email; the password is read from `BAZAAR_PASSWORD`
        #[arg(short, long, env = "BAZAAR_EMAIL")]
        email: String,

        #[command(subcommand)]
        view: DashboardView,
    },
    /// Commission and discount arithmetic
    Pricing {
        #[command(subcommand)]
        action: PricingAction,
    },
    /// Generate a product SKU
    Sku,
}

#[derive(Subcommand)]
enum CartAction {
    /// List lines and the total
    Show,
    /// Add a new line
    Add {
        product_id: ProductId,

        /// At least 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,

        #[arg(long)]
        variant: Option<VariantId>,
    },
    /// Set a line's quantity
    Update {
        line_id: CartLineId,
        /// At least 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        line_id: CartLineId,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List saved products
    Show,
    /// Save a product
    Add {
        product_id: ProductId,
    },
    /// Remove a saved product
    Remove {
        entry_id: WishlistEntryId,
    },
}

#[derive(Subcommand)]
enum DashboardView {
    /// The signed-in seller's figures
    Seller,
    /// Marketplace-wide figures (admin only)
    Admin,
}

#[derive(Subcommand)]
enum PricingAction {
    /// Platform commission on an order total
    Commission {
        amount: Decimal,
    },
    /// Seller earnings on an order total
    Earnings {
        amount: Decimal,
    },
    /// Discount percentage badge
    Discount {
        price: Decimal,
        discount_price: Decimal,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BackendConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::info!("Sentry initialized");
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

    // Offline commands run without configuration
    let config = BackendConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_cli=info,bazaar_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), commands::CliError> = run(cli, config).await;

    if let Err(e) = result {
        e.report();
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(
    cli: Cli,
    config: Result<BackendConfig, bazaar_storefront::ConfigError>,
) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Products {
            category,
            min_price,
            max_price,
            sort,
        } => {
            let filter = bazaar_storefront::models::ProductFilter {
                category,
                min_price,
                max_price,
                sort,
            };
            commands::catalog::list(&config?, &filter).await?;
        }
        Commands::Product { id } => commands::catalog::show(&config?, id).await?,
        Commands::Cart { email, action } => {
            let session = commands::Session::sign_in(&config?, &email).await?;
            match action {
                CartAction::Show => commands::cart::show(&session).await?,
                CartAction::Add {
                    product_id,
                    quantity,
                    variant,
                } => commands::cart::add(&session, product_id, quantity, variant).await?,
                CartAction::Update { line_id, quantity } => {
                    commands::cart::update(&session, line_id, quantity).await?;
                }
                CartAction::Remove { line_id } => commands::cart::remove(&session, line_id).await?,
                CartAction::Clear => commands::cart::clear(&session).await?,
            }
        }
        Commands::Wishlist { email, action } => {
            let session = commands::Session::sign_in(&config?, &email).await?;
            match action {
                WishlistAction::Show => commands::wishlist::show(&session).await?,
                WishlistAction::Add { product_id } => {
                    commands::wishlist::add(&session, product_id).await?;
                }
                WishlistAction::Remove { entry_id } => {
                    commands::wishlist::remove(&session, entry_id).await?;
                }
            }
        }
        Commands::Dashboard { email, view } => {
            let session = commands::Session::sign_in(&config?, &email).await?;
            match view {
                DashboardView::Seller => commands::dashboard::seller(&session).await?,
                DashboardView::Admin => commands::dashboard::admin(&session).await?,
            }
        }
        Commands::Pricing { action } => match action {
            PricingAction::Commission { amount } => commands::pricing::commission(amount),
            PricingAction::Earnings { amount } => commands::pricing::earnings(amount),
            PricingAction::Discount {
                price,
                discount_price,
            } => commands::pricing::discount(price, discount_price),
        },
        Commands::Sku => commands::pricing::sku(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    const LINE: &str = "6f1c2a4e-3b9d-4c1e-9a57-0d2f8e6b1a33";

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_quantity_must_be_positive() {
        let update = Cli::try_parse_from(["bz", "cart", "-e", "a@example.com", "update", LINE, "0"]);
        assert!(update.is_err());

        let add = Cli::try_parse_from([
            "bz", "cart", "-e", "a@example.com", "add", LINE, "--quantity", "0",
        ]);
        assert!(add.is_err());
    }

    #[test]
    fn test_cart_quantity_accepts_one() {
        let update = Cli::try_parse_from(["bz", "cart", "-e", "a@example.com", "update", LINE, "1"]);
        assert!(update.is_ok());

        let add = Cli::try_parse_from(["bz", "cart", "-e", "a@example.com", "add", LINE]);
        assert!(add.is_ok());
    }
}
