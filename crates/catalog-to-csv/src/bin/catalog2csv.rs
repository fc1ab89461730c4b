use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use catalog_to_csv::{
    ExtractOptions, ExtractionReport, OutputFormat, PageSelection, Vocabulary,
    extract_pdfs_to_file,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "catalog2csv",
    version,
    about = "Extract product records from catalog PDFs into CSV or XLSX"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract one record per product page and write them as CSV or XLSX.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path. Repeat for several documents; order is kept.
    #[arg(short, long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Output path. A `.xlsx` extension writes a workbook.
    #[arg(short, long)]
    output: PathBuf,

    /// Write an XLSX workbook whatever the output extension.
    #[arg(long)]
    xlsx: bool,

    /// Page selection like 1-3,5, applied to every document.
    #[arg(long)]
    pages: Option<String>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Category name to look for, in priority order. Repeatable; replaces the
    /// built-in list.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Enable verbose progress and warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let mut vocabulary = Vocabulary::default();
    if !args.categories.is_empty() {
        vocabulary.categories.clone_from(&args.categories);
    }

    Ok(ExtractOptions {
        pages,
        delimiter: args.delimiter as u8,
        vocabulary,
        ..ExtractOptions::default()
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.document, failure.error);
    }

    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} document={:?} page={:?}: {}",
                warning.code, warning.document, warning.page, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let format = if args.xlsx {
        OutputFormat::Xlsx
    } else {
        OutputFormat::from_path(&args.output)
    };
    let report = extract_pdfs_to_file(&args.inputs, &args.output, format, &options)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Extract(args) = cli.command;

    let default_filter = if args.verbose {
        "catalog_to_csv=info"
    } else {
        "catalog_to_csv=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_extract(&args) {
        Ok(report) => {
            log_report(&report, args.verbose);
            if report.failures.len() == args.inputs.len() {
                eprintln!("error: none of the input documents could be read");
                ExitCode::from(1)
            } else if report.is_empty() {
                ExitCode::from(2)
            } else {
                eprintln!(
                    "wrote {} record(s) from {} page(s) to '{}'",
                    report.record_count(),
                    report.page_count,
                    args.output.display()
                );
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
