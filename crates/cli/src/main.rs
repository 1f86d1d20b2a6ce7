//! VetMart CLI - Drive the checkout engine from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Parse a catalog price into centavos
//! vm-cli price parse "R$ 1.234,56"
//!
//! # Format centavos for display
//! vm-cli price format 123456
//!
//! # Resolve an image reference against the API base URL
//! vm-cli image resolve '["/uploads/x.png"]' --base-url http://localhost:3000
//!
//! # Run a scenario file through the whole checkout
//! vm-cli checkout simulate demos/checkout.yaml --seed 42
//! ```
//!
//! # Commands
//!
//! - `price parse` / `price format` - Price normalization
//! - `image resolve` - Image reference resolution
//! - `checkout simulate` - End-to-end checkout from a YAML scenario
//!
//! Logs go to stderr; command output goes to stdout.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "vm-cli")]
#[command(author, version, about = "VetMart checkout tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and format prices
    Price {
        #[command(subcommand)]
        action: PriceAction,
    },
    /// Resolve image references
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Run checkout scenarios
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
}

#[derive(Subcommand)]
enum PriceAction {
    /// Parse a raw catalog price
    Parse {
        /// Raw price text (e.g. "R$ 45,90")
        input: String,

        /// Treat malformed input as zero instead of failing
        #[arg(short, long)]
        lenient: bool,
    },
    /// Format an amount in centavos
    Format {
        /// Amount in minor units
        #[arg(allow_negative_numbers = true)]
        minor: i64,
    },
}

#[derive(Subcommand)]
enum ImageAction {
    /// Resolve one raw image reference
    Resolve {
        /// Raw reference as stored by the API
        input: String,

        /// API base URL (defaults to `VETMART_API_BASE_URL`)
        #[arg(short, long)]
        base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Run a YAML scenario from cart to confirmation
    Simulate {
        /// Path to the scenario file
        file: String,

        /// Seed for order number and tracking code generation
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vetmart_checkout=info,vetmart_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Price { action } => match action {
            PriceAction::Parse { input, lenient } => commands::price::parse(&input, lenient)?,
            PriceAction::Format { minor } => commands::price::format(minor),
        },
        Commands::Image { action } => match action {
            ImageAction::Resolve { input, base_url } => {
                commands::image::resolve(&input, base_url.as_deref())?;
            }
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Simulate { file, seed } => {
                commands::checkout::simulate(&file, seed)?;
            }
        },
    }
    Ok(())
}
