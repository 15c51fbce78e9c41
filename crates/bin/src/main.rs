//! privcap CLI binary.
//!
//! Provides a command-line interface for analyzing private-investment
//! spreadsheet exports.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use integration::config_loader::{InputArgs, build_config};
use integration::input::load_table;
use integration::logging::init_tracing;
use privcap::{Analysis, AnalysisConfig, run_analysis};
use privcap_data::presets;
use privcap_metrics::MetricKind;
use privcap_output::{
    ExportFormat, Exporter, PortfolioSummary, RankingTable, ReportBuilder, cumulative_rows,
    fund_rows, record_rows,
};
use privcap_portfolio::{SortOrder, top_n};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "privcap")]
#[command(about = "privcap: private-investment portfolio metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Portfolio overview, fund breakdown and diagnostics
    Analyze {
        /// CSV export to analyze
        file: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Per-fund aggregates only
    Funds {
        /// CSV export to analyze
        file: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Best (or worst) investments by a metric
    Top {
        /// CSV export to analyze
        file: PathBuf,

        /// Metric to rank by: moic, roi, annualized_roi or irr
        #[arg(long, default_value = "moic")]
        metric: String,

        /// Number of investments to show
        #[arg(short, long, default_value = "10")]
        n: usize,

        /// Show the lowest values first
        #[arg(long)]
        ascending: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write a table to a .csv or .json file
    Export {
        /// CSV export to analyze
        file: PathBuf,

        /// Output file; the extension selects CSV or JSON
        #[arg(long, short)]
        output: PathBuf,

        /// Table to write
        #[arg(long, value_enum, default_value_t = ExportTable::Records)]
        what: ExportTable,

        #[command(flatten)]
        input: InputArgs,
    },

    /// List the built-in column presets
    Presets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportTable {
    Records,
    Funds,
    Cumulative,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            file,
            input,
            format,
        } => {
            let (config, analysis) = analyze_file(&file, &input)?;
            print_analysis(&file, &config, &analysis, format)?;
        }
        Commands::Funds {
            file,
            input,
            format,
        } => {
            let (config, analysis) = analyze_file(&file, &input)?;
            print_funds(&file, &config, &analysis, format)?;
        }
        Commands::Top {
            file,
            metric,
            n,
            ascending,
            input,
            format,
        } => {
            let metric: MetricKind = metric.parse()?;
            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            let (_, analysis) = analyze_file(&file, &input)?;
            print_top(&analysis, metric, n, order, format)?;
        }
        Commands::Export {
            file,
            output,
            what,
            input,
        } => {
            let (_, analysis) = analyze_file(&file, &input)?;
            export_table(&analysis, what, &output)?;
        }
        Commands::Presets => list_presets(),
    }

    Ok(())
}

fn analyze_file(
    file: &Path,
    input: &InputArgs,
) -> Result<(AnalysisConfig, Analysis), Box<dyn std::error::Error>> {
    let config = build_config(input)?;
    let table = load_table(file)?;
    let analysis = run_analysis(&table, &config)?;
    Ok((config, analysis))
}

fn source_name(file: &Path) -> String {
    file.file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn summary_for(file: &Path, config: &AnalysisConfig, analysis: &Analysis) -> PortfolioSummary {
    PortfolioSummary::new(
        format!("Portfolio Summary: {}", source_name(file)),
        config.horizon,
        analysis.overview.clone(),
        analysis.funds.clone(),
    )
    .with_rows(
        analysis.diagnostics.total_rows,
        analysis.diagnostics.dropped_rows,
    )
}

fn print_analysis(
    file: &Path,
    config: &AnalysisConfig,
    analysis: &Analysis,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Text => {
            print!("{}", summary_for(file, config, analysis).to_ascii_table());
            if let Some(preset) = &analysis.preset {
                println!("Columns: {preset} preset");
            }
            for failure in &analysis.diagnostics.failures {
                println!("  Dropped {failure}");
            }
        }
        OutputFormat::Markdown => {
            print!("{}", summary_for(file, config, analysis).to_markdown());
        }
        OutputFormat::Json => {
            let report = ReportBuilder::new()
                .source(source_name(file))
                .evaluation_date(analysis.overview.evaluation_date)
                .horizon(config.horizon)
                .contents(analysis)?
                .build()?;
            report.write_to(&mut std::io::stdout().lock())?;
        }
    }
    Ok(())
}

fn print_funds(
    file: &Path,
    config: &AnalysisConfig,
    analysis: &Analysis,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                fund_rows(&analysis.funds).export_to_string(ExportFormat::PrettyJson)?
            );
        }
        OutputFormat::Markdown | OutputFormat::Text => {
            let mut summary = summary_for(file, config, analysis);
            summary.title = format!("Funds: {}", source_name(file));
            if format == OutputFormat::Markdown {
                print!("{}", summary.to_markdown());
            } else {
                print!("{}", summary.to_ascii_table());
            }
        }
    }
    Ok(())
}

fn print_top(
    analysis: &Analysis,
    metric: MetricKind,
    n: usize,
    order: SortOrder,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let ranked = top_n(&analysis.records, metric, n, order);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                record_rows(&ranked).export_to_string(ExportFormat::PrettyJson)?
            );
        }
        OutputFormat::Markdown => {
            print!("{}", RankingTable::new(metric, order, ranked).to_markdown());
        }
        OutputFormat::Text => {
            print!("{}", RankingTable::new(metric, order, ranked).to_ascii_table());
        }
    }
    Ok(())
}

fn export_table(
    analysis: &Analysis,
    what: ExportTable,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = ExportFormat::from_path(output)?;
    match what {
        ExportTable::Records => record_rows(&analysis.records).export_to_file(output, format)?,
        ExportTable::Funds => fund_rows(&analysis.funds).export_to_file(output, format)?,
        ExportTable::Cumulative => {
            cumulative_rows(&analysis.cumulative).export_to_file(output, format)?;
        }
    }
    info!(path = %output.display(), table = ?what, "export written");
    eprintln!("Wrote {}", output.display());
    Ok(())
}

fn list_presets() {
    println!("\nColumn Presets:");
    println!("{}", "=".repeat(60));
    for preset in presets() {
        println!("\n{} - {}", preset.name, preset.description);
        for (field, header) in preset.mapping().iter() {
            println!("  {:<18} <- {}", field.to_string(), header);
        }
    }
    println!();
}
