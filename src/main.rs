//! CLI entry point for the attendance rater.
//!
//! Provides subcommands for computing weighted attendance tables from
//! sign-in sheets and for checking how a gathering name is classified.

use anyhow::Result;
use attendance_rater::{
    analyzers::compute_statistics,
    classify::{Classification, Classifier},
    config::WeightConfig,
    output::{REPORT_FILE, log_summary, write_csv_tables, write_json_report},
    parser::load_all,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "attendance_rater")]
#[command(about = "Weighted attendance statistics from gathering sign-in sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One CSV file per table
    Csv,
    /// A single JSON report
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute attendance tables from CSV or JSON sign-in sheets
    Analyze {
        /// Sign-in sheets to read, in order
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// JSON object of category and bonus weights
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// JSON category table; the built-in table is used when omitted
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Directory to write the report into
        #[arg(short, long, default_value = "report")]
        output_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Show which category a gathering name falls into
    Classify {
        #[arg(value_name = "GATHERING_NAME")]
        gathering: String,

        /// JSON category table; the built-in table is used when omitted
        #[arg(short, long)]
        categories: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/attendance_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("attendance_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            files,
            weights,
            categories,
            output_dir,
            format,
        } => {
            let classifier = load_classifier(categories.as_deref())?;
            let config = match weights {
                Some(path) => {
                    let config = WeightConfig::load(&path)?;
                    for (key, weight) in config.iter() {
                        debug!(key, weight, "Weight");
                    }
                    config
                }
                None => {
                    warn!("No weights given, every category weighs 1.0");
                    WeightConfig::default()
                }
            };

            let rows = load_all(&files)?;
            let report = compute_statistics(&rows, &classifier, &config);
            log_summary(&report);

            match format {
                OutputFormat::Csv => {
                    let paths = write_csv_tables(&output_dir, &report)?;
                    for path in paths {
                        info!(path = %path.display(), "Table written");
                    }
                }
                OutputFormat::Json => {
                    std::fs::create_dir_all(&output_dir)?;
                    let path = output_dir.join(REPORT_FILE);
                    write_json_report(&path, &report)?;
                    info!(path = %path.display(), "Report written");
                }
            }
        }
        Commands::Classify {
            gathering,
            categories,
        } => {
            let classifier = load_classifier(categories.as_deref())?;
            match classifier.classify(&gathering) {
                Classification::Category(category) => println!("{category}"),
                Classification::Unclassified => {
                    println!("unclassified");
                    let known: Vec<&str> =
                        classifier.rules().iter().map(|rule| rule.name.as_str()).collect();
                    info!(categories = ?known, "No category keyword found in the name");
                }
            }
        }
    }

    Ok(())
}

fn load_classifier(path: Option<&Path>) -> Result<Classifier> {
    match path {
        Some(path) => Classifier::load(path),
        None => Ok(Classifier::default()),
    }
}
