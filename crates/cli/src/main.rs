//! Stockroom CLI - browse and manage the product catalog.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the password may also come from STOCKROOM_PASSWORD)
//! stockroom login -u admin -p secret
//!
//! # List products, nine per page, newest first
//! stockroom products list --page 2
//!
//! # Add a product (Admin only)
//! stockroom products add --name "Desk Lamp" --price 24.50 --description "Warm white"
//!
//! # Run several commands against one cached session
//! stockroom shell
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `register`, `status` - account and session
//! - `products list|show|add|update|delete` - the catalog
//! - `shell` - interactive prompt sharing one product cache

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use stockroom_client::{ClientConfig, Stockroom};
use stockroom_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom product catalog client")]
struct Cli {
    /// Base URL of the catalog API (overrides `STOCKROOM_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session and cached products
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show who is logged in
    Status,
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Interactive prompt; commands share one session and product cache
    Shell,
}

#[derive(Subcommand)]
pub(crate) enum ProductAction {
    /// List products
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product
    Show { id: ProductId },
    /// Add a product (Admin only)
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        price: String,

        #[arg(long)]
        description: String,

        #[arg(long, default_value = "")]
        image_url: String,

        #[arg(long)]
        out_of_stock: bool,
    },
    /// Change a product (Admin only); omitted fields keep their value
    Update {
        id: ProductId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        out_of_stock: Option<bool>,
    },
    /// Delete a product (Admin only)
    Delete { id: ProductId },
}

/// Initialize Sentry error tracking when `SENTRY_DSN` is set.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
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
    dotenvy::dotenv().ok();

    let _sentry_guard = init_sentry();

    // Logs go to stderr so command output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stockroom=info,stockroom_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = stockroom_client::config::parse_api_url(url)?;
    }

    let app = Stockroom::from_config(&config)?;

    match cli.command {
        Commands::Shell => commands::shell::run(&app).await?,
        command => execute(&app, command).await?,
    }
    Ok(())
}

/// Run one command against `app`.
pub(crate) async fn execute(app: &Stockroom, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Login { username, password } => {
            commands::account::login(app, &username, &SecretString::from(password)).await
        }
        Commands::Logout => commands::account::logout(app).await,
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(app, username, email, password).await,
        Commands::Status => commands::account::status(app),
        Commands::Products { action } => match action {
            ProductAction::List { page } => commands::products::list(app, page).await,
            ProductAction::Show { id } => commands::products::show(app, id).await,
            ProductAction::Add {
                name,
                price,
                description,
                image_url,
                out_of_stock,
            } => {
                let form = stockroom_core::ProductForm {
                    name,
                    price,
                    description,
                    image_url,
                    out_of_stock,
                };
                commands::products::add(app, &form).await
            }
            ProductAction::Update {
                id,
                name,
                price,
                description,
                image_url,
                out_of_stock,
            } => {
                let changes = commands::products::ProductChanges {
                    name,
                    price,
                    description,
                    image_url,
                    out_of_stock,
                };
                commands::products::update(app, id, changes).await
            }
            ProductAction::Delete { id } => commands::products::delete(app, id).await,
        },
        Commands::Shell => Err(CommandError::NestedShell),
    }
}
