//! Medina CLI - browse the catalog, manage the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # List t-shirts
//! medina products --filter shirts
//!
//! # Add a product variant to the cart
//! medina cart add 12 --size M --color Black
//!
//! # Show the cart with totals for a city
//! medina cart show --city Casablanca
//!
//! # Place the order
//! medina checkout --first-name Salma --last-name Idrissi --email salma@example.ma \
//!     --phone 0600000000 --address "12 Rue Atlas" --city Casablanca --zip-code 20000
//!
//! # Send the shop a message
//! medina contact --first-name Salma --last-name Idrissi --email salma@example.ma \
//!     --message "Do you ship to Tangier?"
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `medina_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use medina_core::ProductId;
use medina_storefront::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "medina")]
#[command(author, version, about = "Medina storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// `all`, `shirts`, `totebags`, or text to search for
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Show one product and its options
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout(commands::checkout::CheckoutArgs),
    /// Send the shop a message
    Contact(commands::contact::ContactArgs),
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show {
        /// City used to price shipping
        #[arg(long, default_value = "")]
        city: String,
    },
    /// Add one unit of a product
    Add {
        id: ProductId,
        #[arg(short, long)]
        size: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        id: ProductId,
        quantity: i64,
        #[arg(short, long)]
        size: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        id: ProductId,
        #[arg(short, long)]
        size: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Change the size or color of a product's lines
    Options(commands::cart::OptionsArgs),
    /// Empty the cart
    Clear,
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medina_storefront=info,medina_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be up before the tracing layer is installed
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), commands::CommandError> {
    let mut session = commands::open_session(config)?;

    match cli.command {
        Commands::Products { filter } => commands::catalog::list(&mut session, &filter).await?,
        Commands::Product { id } => commands::catalog::show(&session, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show { city } => commands::cart::show(&mut session, &city),
            CartAction::Add { id, size, color } => {
                commands::cart::add(&mut session, id, size, color).await?;
            }
            CartAction::Update {
                id,
                quantity,
                size,
                color,
            } => commands::cart::update(&mut session, id, quantity, size, color),
            CartAction::Remove { id, size, color } => {
                commands::cart::remove(&mut session, id, size, color);
            }
            CartAction::Options(args) => commands::cart::options(&mut session, &args),
            CartAction::Clear => commands::cart::clear(&mut session),
        },
        Commands::Checkout(args) => commands::checkout::run(&mut session, args).await?,
        Commands::Contact(args) => commands::contact::run(&session, args).await?,
    }
    Ok(())
}
