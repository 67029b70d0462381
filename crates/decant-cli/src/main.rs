//! CLI for importing distributor wine invoices.

mod run;

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Import distributor wine invoices from layout-mode PDF text
#[derive(Parser)]
#[command(name = "decant")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for PDF invoices
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Process at most this many files
    #[arg(short, long)]
    limit: Option<usize>,

    /// Write parsed invoices to the database (requires DATABASE_URL)
    #[arg(long)]
    write: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    run::run(cli).await
}
