//! Tillpoint CLI - bulk import, export, reports and voice phrase testing.
//!
//! Every command works on an in-memory catalog loaded from a YAML seed, so it
//! can run against a snapshot without a running register.
//!
//! # Usage
//!
//! ```bash
//! # Import products into a seed and write the result back
//! tp-cli import products products.csv --seed catalog.yaml --out catalog.yaml
//!
//! # Export the catalog
//! tp-cli export catalog --seed catalog.yaml --format html --out catalog.html
//!
//! # Daily sales report
//! tp-cli report daily --seed catalog.yaml --date 2026-03-14
//!
//! # Which command does a transcript resolve to?
//! tp-cli voice match --page pos "add coffee to cart" --seed catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(author, version, about = "Tillpoint CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk import from CSV
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    /// Export catalog data
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },
    /// Sales reports
    Report {
        #[command(subcommand)]
        report: ReportKind,
    },
    /// Voice command tools
    Voice {
        #[command(subcommand)]
        action: VoiceAction,
    },
}

#[derive(Subcommand)]
enum ImportTarget {
    /// Import products (id,name,price,category,in_stock,store_id,barcode,image,description)
    Products {
        /// CSV file with a header row
        csv: PathBuf,
        #[command(flatten)]
        seed: SeedArgs,
    },
    /// Import customers (id,name,email,phone,address,notes)
    Customers {
        /// CSV file with a header row
        csv: PathBuf,
        #[command(flatten)]
        seed: SeedArgs,
    },
}

#[derive(clap::Args)]
struct SeedArgs {
    /// YAML catalog seed to import into
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Write the resulting catalog as YAML
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ExportTarget {
    /// Export the product catalog
    Catalog {
        /// YAML catalog seed
        #[arg(long)]
        seed: PathBuf,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Html,
}

#[derive(Subcommand)]
enum ReportKind {
    /// Sales summary for one day
    Daily {
        /// YAML catalog seed
        #[arg(long)]
        seed: PathBuf,

        /// Day to report (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum VoiceAction {
    /// Show which command a transcript resolves to
    Match {
        /// Page whose commands are active (pos, orders, customers, ...)
        #[arg(long, default_value = "pos")]
        page: String,

        /// The spoken phrase
        transcript: String,

        /// YAML catalog seed providing product names
        #[arg(long)]
        seed: Option<PathBuf>,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Import { target } => match target {
            ImportTarget::Products { csv, seed } => {
                commands::import::products(&csv, seed.seed.as_deref(), seed.out.as_deref())?;
            }
            ImportTarget::Customers { csv, seed } => {
                commands::import::customers(&csv, seed.seed.as_deref(), seed.out.as_deref())?;
            }
        },
        Commands::Export { target } => match target {
            ExportTarget::Catalog { seed, format, out } => {
                let format = match format {
                    ExportFormat::Csv => commands::export::Format::Csv,
                    ExportFormat::Html => commands::export::Format::Html,
                };
                commands::export::catalog(&seed, format, out.as_deref())?;
            }
        },
        Commands::Report { report } => match report {
            ReportKind::Daily { seed, date } => commands::report::daily(&seed, date)?,
        },
        Commands::Voice { action } => match action {
            VoiceAction::Match {
                page,
                transcript,
                seed,
            } => commands::voice::match_transcript(&page, &transcript, seed.as_deref())?,
        },
    }
    Ok(())
}
