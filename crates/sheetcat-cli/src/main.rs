//! sheetcat CLI
//!
//! Command-line tool for consolidating the tabular files in a directory
//! into one combined table, keeping only files whose headers match the
//! first readable file.

use clap::{Parser, Subcommand};
use sheetcat_core::{
    discover, merge_directory, normalize, timestamped_output_path, write_table, FileStatus,
    FsReader, MergeResult, TableReader,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetcat")]
#[command(about = "Merge matching tabular files into one table", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every matching file in a directory into one output table
    Merge {
        /// Directory holding the source files
        #[arg(short, long)]
        dir: PathBuf,

        /// Header row number (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        header_row: u64,

        /// Output file (.xlsx or .csv); defaults to a timestamped workbook
        /// in the source directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// List the files a merge run would consider
    Scan {
        /// Directory to scan
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Show a file's raw and normalized header labels
    Headers {
        /// Path to a tabular file
        #[arg(short, long)]
        file: PathBuf,

        /// Header row number (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        header_row: u64,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> sheetcat_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            dir,
            header_row,
            output,
            json,
        } => cmd_merge(&dir, header_row, output, json),
        Commands::Scan { dir } => cmd_scan(&dir),
        Commands::Headers { file, header_row } => cmd_headers(&file, header_row),
    }
}

fn cmd_merge(
    dir: &Path,
    header_row: u64,
    output: Option<PathBuf>,
    json: bool,
) -> sheetcat_core::Result<()> {
    // The core works with 0-based header rows
    let header_index = (header_row - 1) as usize;

    let result = merge_directory(dir, header_index)?;

    if json {
        println!("{}", result.to_json()?);
    } else {
        print_report(&result);
    }

    if result.is_empty() {
        if !json {
            println!();
            println!("No rows were merged; no output file written.");
        }
        return Ok(());
    }

    let destination = output.unwrap_or_else(|| timestamped_output_path(dir));
    write_table(&result.table, &destination)?;

    if !json {
        println!();
        println!(
            "Wrote {} rows to {}",
            result.row_count(),
            destination.display()
        );
    }

    Ok(())
}

fn cmd_scan(dir: &Path) -> sheetcat_core::Result<()> {
    let files = discover(dir)?;

    println!("Found {} file(s) in {}:", files.len(), dir.display());
    for file in &files {
        println!("  {}", file.display());
    }

    Ok(())
}

fn cmd_headers(file: &Path, header_row: u64) -> sheetcat_core::Result<()> {
    let header_index = (header_row - 1) as usize;
    let labels = FsReader.read_headers(file, header_index)?;

    println!("File: {}", file.display());
    println!("Header row: {}", header_row);
    println!();
    for (i, label) in labels.iter().enumerate() {
        println!("  {}. '{}' -> '{}'", i + 1, label, normalize(label));
    }

    Ok(())
}

fn print_report(result: &MergeResult) {
    println!("Baseline: {}", result.baseline.display());
    println!("Columns: {}", result.table.column_names().join(", "));
    println!();

    for outcome in &result.outcomes {
        match &outcome.status {
            FileStatus::Included { rows } => {
                println!("  included {} ({} rows)", outcome.path.display(), rows);
            }
            FileStatus::Skipped { reason, detail } => {
                if detail.is_empty() {
                    println!("  skipped  {} ({})", outcome.path.display(), reason);
                } else {
                    println!("  skipped  {} ({}: {})", outcome.path.display(), reason, detail);
                }
            }
        }
    }

    println!();
    println!(
        "{} included, {} skipped, {} rows total",
        result.included_count(),
        result.skipped_count(),
        result.row_count()
    );
}
