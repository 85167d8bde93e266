use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mitsumori_core::ExtractConfig;
use mitsumori_ocr::OcrBackend;
use tracing_subscriber::EnvFilter;

mod batch;
mod commands;

/// Where the quotation files live when no directory is given.
const DEFAULT_INPUT_DIR: &str = "見積書";

#[derive(Parser)]
#[command(name = "mitsumori")]
#[command(about = "Scrape line items from supplier quotation files", long_about = None)]
#[command(version)]
struct Cli {
    /// Extraction config TOML overriding the built-in keyword and vendor tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract items from every quotation file and print them as JSON.
    Scan {
        #[arg(default_value = DEFAULT_INPUT_DIR)]
        dir: PathBuf,
        /// Write the per-file run report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Extract and write the consolidated summary workbook.
    Export {
        #[arg(default_value = DEFAULT_INPUT_DIR)]
        dir: PathBuf,
        #[arg(short, long, default_value = "quotation_summary.xlsx")]
        output: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Extract and merge into an existing master-list workbook, preserving
    /// its row styling.
    Update {
        #[arg(default_value = DEFAULT_INPUT_DIR)]
        dir: PathBuf,
        /// The master list to insert into.
        #[arg(long)]
        master: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Classify each PDF as text-based or image-based.
    Check {
        #[arg(default_value = DEFAULT_INPUT_DIR)]
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractConfig::load(path)?,
        None => ExtractConfig::default(),
    };

    // One OCR engine for the whole run, handed by reference to every
    // component that needs it.
    let ocr = build_ocr();

    match cli.command {
        Command::Scan { dir, report } => {
            commands::scan(&dir, &config, ocr.as_deref(), report.as_deref())
        }
        Command::Export { dir, output, report } => {
            commands::export(&dir, &output, &config, ocr.as_deref(), report.as_deref())
        }
        Command::Update { dir, master, report } => {
            commands::update(&dir, &master, &config, ocr.as_deref(), report.as_deref())
        }
        Command::Check { dir } => commands::check(&dir),
    }
}

#[cfg(feature = "ocr")]
fn build_ocr() -> Option<Box<dyn OcrBackend>> {
    Some(Box::new(mitsumori_ocr::TesseractRecognizer::for_quotes()))
}

#[cfg(not(feature = "ocr"))]
fn build_ocr() -> Option<Box<dyn OcrBackend>> {
    tracing::debug!("built without the `ocr` feature — scanned PDFs will be skipped");
    None
}
