//! extract - Excel workbook to JSON conversion tool
//!
//! Converts an .xlsx workbook into a single JSON file or into one JSON
//! file per sheet.

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sheetdump::{ExtractOptions, JsonFormat};
use std::path::PathBuf;

/// Extract spreadsheet data from an Excel workbook to JSON
#[derive(Parser)]
#[command(
    name = "extract",
    version,
    about = "Extract Excel workbook sheets to JSON",
    long_about = "extract - Excel workbook to JSON conversion.\n\n\
                  Writes one selected sheet (or all sheets) as JSON grids, either\n\
                  into a single file or as one file per sheet in a directory."
)]
struct Cli {
    /// Path to the input .xlsx workbook
    input: PathBuf,

    /// Destination file, or directory with --split-sheets
    output: PathBuf,

    /// Extract only this sheet, matched verbatim (case and whitespace
    /// sensitive)
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Write one JSON file per selected sheet into the output directory
    #[arg(long)]
    split_sheets: bool,

    /// Output compact JSON (no indentation)
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions {
        sheet: cli.sheet,
        split_sheets: cli.split_sheets,
        format: if cli.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        },
    };

    let pb = create_spinner("Extracting workbook...");
    let summary = sheetdump::extract(&cli.input, &cli.output, &options)?;
    pb.finish_and_clear();

    for file in &summary.files {
        println!("{} Wrote {}", "✓".green().bold(), file.display());
    }
    if summary.files.is_empty() {
        println!("{} No sheets to extract", "!".yellow().bold());
    }

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
