//! RocketShoes CLI - Drive the cart store from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rs-cart show
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Hold 3 units of product 1
//! rs-cart update 1 3
//!
//! # Drop product 1 from the cart
//! rs-cart remove 1
//! ```
//!
//! Configuration is read from the environment (see `rocketshoes_cart::config`).
//! The process exits with status 1 when the operation is rejected or fails.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rocketshoes_cart::notify::ChannelNotifier;
use rocketshoes_cart::{AmountUpdate, CartConfig, CartStore};
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount held for a product
    Update {
        /// Product ID
        product_id: ProductId,
        /// Units to hold
        amount: u32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
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

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to warn so command output stays readable; RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=warn,rocketshoes_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::debug!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), commands::CommandError> {
    let (notifier, mut notifications) = ChannelNotifier::new();
    let store = CartStore::from_config(config, Arc::new(notifier))?;

    let result = match cli.command {
        Commands::Show => {
            commands::show(&store);
            Ok(())
        }
        Commands::Add { product_id } => store.add_product(product_id).await.map(|_| ()),
        Commands::Remove { product_id } => store.remove_product(product_id).await.map(|_| ()),
        Commands::Update { product_id, amount } => store
            .update_product_amount(AmountUpdate::new(product_id, amount))
            .await
            .map(|_| ()),
    };

    commands::print_notifications(&mut notifications);
    result.map_err(Into::into)
}
