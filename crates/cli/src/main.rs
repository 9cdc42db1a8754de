//! Shopfront CLI - A terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shopfront products --search tee --category Men --sort price-low-high
//! shopfront product 66a1f0
//!
//! # Manage the cart
//! shopfront cart add 66a1f0 --size M
//! shopfront cart update 66a1f0 M 3
//! shopfront cart show --promo SAVE10
//!
//! # Check a promo code against the current cart
//! shopfront promo SAVE10
//!
//! # Sign in / out (the token comes from the shop's login flow)
//! shopfront login <token>
//! shopfront logout
//!
//! # Dark mode preference
//! shopfront theme toggle
//! ```
//!
//! # Commands
//!
//! - `products`, `product` - Catalog browsing
//! - `cart` - Show, add, update
//! - `promo` - Apply a promo code and show the discounted total
//! - `login`, `logout` - Session token management
//! - `theme` - Dark mode preference

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::ShopState;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::catalog::{ProductsArgs, SortArg};
use commands::theme::ThemeChoice;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products in the catalog
    Products {
        /// Only products whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only products in these categories
        #[arg(short, long)]
        category: Vec<String>,

        /// Only products in these sub-categories
        #[arg(long)]
        sub_category: Vec<String>,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SortArg::Relevant)]
        sort: SortArg,

        /// Only bestsellers
        #[arg(long)]
        bestsellers: bool,
    },
    /// Show one product and related products
    Product {
        /// Product id
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Apply a promo code to the current cart
    Promo {
        /// Promo code (case-sensitive)
        code: String,
    },
    /// Sign in with a session token and sync the cart
    Login {
        /// Session token issued by the shop backend
        token: String,
    },
    /// Sign out and empty the local cart
    Logout,
    /// Show or change the dark mode preference
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show {
        /// Promo code to apply before computing totals
        #[arg(short, long)]
        promo: Option<String>,
    },
    /// Add one unit of a product
    Add {
        /// Product id
        id: String,

        /// Size label
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Set the quantity of a cart line (0 removes it)
    Update {
        /// Product id
        id: String,

        /// Size label
        size: String,

        /// New quantity
        quantity: u32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::fatal(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=warn,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = match ShopState::open(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to open client storage: {e}");
            std::process::exit(1);
        }
    };

    let mut notifications = state.notifier().subscribe();
    let result = run(cli, &state).await;
    output::notifications(&notify::drain(&mut notifications));

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &ShopState) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Products {
            search,
            category,
            sub_category,
            sort,
            bestsellers,
        } => {
            let args = ProductsArgs {
                search,
                categories: category,
                sub_categories: sub_category,
                sort,
                bestsellers,
            };
            commands::catalog::products(state, args).await?;
        }
        Commands::Product { id } => commands::catalog::product(state, &id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show { promo } => commands::cart::show(state, promo.as_deref()).await?,
            CartAction::Add { id, size } => {
                commands::cart::add(state, &id, size.as_deref()).await?;
            }
            CartAction::Update { id, size, quantity } => {
                commands::cart::update(state, &id, &size, quantity).await?;
            }
        },
        Commands::Promo { code } => commands::cart::show(state, Some(&code)).await?,
        Commands::Login { token } => commands::session::login(state, token).await?,
        Commands::Logout => commands::session::logout(state)?,
        Commands::Theme { choice } => commands::theme::theme(state, choice)?,
    }
    Ok(())
}
