mod commands;

use clap::{Parser, Subcommand};
use lotto_core::FileCookieStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lotto")]
#[command(about = "Cookie-persisted weighted coin flips for experiment gating")]
#[command(version)]
struct Cli {
    /// Cookie jar file (defaults to the platform data directory)
    #[arg(short, long, global = true)]
    jar: Option<PathBuf>,

    /// Host the jar belongs to; new records get its root domain
    #[arg(long, global = true)]
    host: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the decision for a handle, or replay the persisted one
    Draw {
        /// Experiment handle
        handle: String,
        /// Win odds as N/D, or a bare percent
        #[arg(short, long, default_value = "50/100")]
        odds: String,
        /// Days until the decision expires
        #[arg(short, long, default_value_t = 7)]
        expires: u32,
        /// Explicit cookie domain (overrides the jar host)
        #[arg(short, long)]
        domain: Option<String>,
        /// Seed for a reproducible draw
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Check whether a handle holds a winning decision
    Check {
        /// Experiment handle
        handle: String,
    },
    /// Show the persisted record for a handle
    Status {
        /// Experiment handle
        handle: String,
    },
    /// List every persisted decision in the jar
    List,
    /// Clear the decision for a handle so the next draw re-rolls
    Reset {
        /// Experiment handle
        handle: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "lotto={},lotto_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get cookie jar path
    let jar = cli.jar.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lotto")
            .join("cookies.json")
    });

    // Open the cookie jar
    let store = Arc::new(match cli.host {
        Some(host) => FileCookieStore::with_host(&jar, host)?,
        None => FileCookieStore::open(&jar)?,
    });

    // Execute command
    let result = match cli.command {
        Commands::Draw {
            handle,
            odds,
            expires,
            domain,
            seed,
        } => commands::draw(&store, &handle, &odds, expires, domain, seed, cli.verbose),
        Commands::Check { handle } => commands::check(&store, &handle),
        Commands::Status { handle } => commands::status(&store, &handle),
        Commands::List => commands::list(&store),
        Commands::Reset { handle, force } => commands::reset(&store, &handle, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
