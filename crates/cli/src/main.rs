//! Shopfront CLI - browse the store, manage the cart and your account.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search
//! shop products -k phone
//! shop next
//! shop product 5f1d7c
//!
//! # Cart
//! shop cart add 5f1d7c --qty 2
//! shop cart show
//! shop cart checkout
//!
//! # Account
//! shop login -e jane@example.com -p secret
//! shop orders --recent 3
//! ```
//!
//! Session state (identity, cart, last visited location) is persisted in
//! `SHOPFRONT_STATE_DIR` between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::config::ClientConfig;
use shopfront_storefront::error::AppError;
use shopfront_storefront::state::AppContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally searching and jumping to a page
    Products {
        /// Search keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Show the next page of the current listing
    Next,
    /// Show the previous page of the current listing
    Prev,
    /// Show a product with its reviews
    Product {
        /// Product id
        id: String,
    },
    /// Review a product (requires login)
    Review {
        /// Product id
        id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text
        #[arg(short, long)]
        comment: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and empty the cart
    Logout,
    /// Show or update your profile (requires login)
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// List your orders (requires login)
    Orders {
        /// Only the N most recent orders
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Show one order (requires login)
    Order {
        /// Order id
        id: String,
    },
    /// Navigate to an in-app path such as `/cart` or `/?keyword=phone&page=2`
    Open {
        path: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and subtotal
    Show,
    /// Add a product, merging with any existing line
    Add {
        /// Product id
        id: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a cart line
    Set {
        /// Product id
        id: String,

        qty: u32,
    },
    /// Remove a cart line
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Proceed to checkout
    Checkout,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show profile and recent orders
    Show,
    /// Update name, email or password
    Update {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        password: Option<String>,

        #[arg(long)]
        confirm_password: Option<String>,
    },
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::error(&AppError::from(e));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=info,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        output::error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), AppError> {
    let mut nav = commands::Navigator::open(&config.state_dir)?;
    let mut ctx = AppContext::new(config)?;

    let result = execute(cli.command, &mut ctx, &mut nav).await;
    if let Err(AppError::AuthRequired { redirect }) = &result {
        nav.go(redirect.clone());
    }
    nav.save()?;
    result
}

async fn execute(
    command: Commands,
    ctx: &mut AppContext,
    nav: &mut commands::Navigator,
) -> Result<(), AppError> {
    match command {
        Commands::Products { keyword, page } => {
            commands::catalog::products(ctx, nav, keyword.as_deref(), page).await
        }
        Commands::Next => commands::catalog::step(ctx, nav, 1).await,
        Commands::Prev => commands::catalog::step(ctx, nav, -1).await,
        Commands::Product { id } => commands::catalog::product(ctx, nav, &id).await,
        Commands::Review {
            id,
            rating,
            comment,
        } => commands::catalog::review(ctx, nav, &id, rating, &comment).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx, nav),
            CartAction::Add { id, qty } => commands::cart::add(ctx, &id, qty).await,
            CartAction::Set { id, qty } => commands::cart::set(ctx, &id, qty),
            CartAction::Remove { id } => commands::cart::remove(ctx, &id),
            CartAction::Clear => commands::cart::clear(ctx),
            CartAction::Checkout => commands::cart::checkout(ctx, nav),
        },
        Commands::Login { email, password } => {
            let password = SecretString::from(password);
            commands::account::login(ctx, nav, &email, &password).await
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let password = SecretString::from(password);
            let confirm = SecretString::from(confirm_password);
            commands::account::register(ctx, nav, &name, &email, &password, &confirm).await
        }
        Commands::Logout => commands::account::logout(ctx, nav),
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::profile(ctx, nav).await,
            ProfileAction::Update {
                name,
                email,
                password,
                confirm_password,
            } => {
                let password = password.map(SecretString::from);
                let confirm = confirm_password.map(SecretString::from);
                commands::account::update_profile(
                    ctx,
                    name.as_deref(),
                    email.as_deref(),
                    password.as_ref(),
                    confirm.as_ref(),
                )
                .await
            }
        },
        Commands::Orders { recent } => commands::account::orders(ctx, nav, recent).await,
        Commands::Order { id } => commands::account::order(ctx, nav, &id).await,
        Commands::Open { path } => commands::open(ctx, nav, &path).await,
    }
}
