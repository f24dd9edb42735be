use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use author_credit::annotate::annotate_corpus;
use author_credit::config::{self, init, validate_config, Config, Settings};
use author_credit::corpus::{
    expand_corpus_paths, normalize_corpus, read_corpus, read_researchers, summarize, CorpusSummary, Document,
};
use author_credit::metrics::{aggregate_researchers, dedup_researchers};
use author_credit::output::{self, MetricsReport, OutputFormat, RunSummary};
use author_credit::schema::{compare_author_counts, model_schemas, Schema};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Default)]
struct Selection {
    /// Schema to compute (repeatable; default: config, then all)
    #[arg(short, long = "schema", value_name = "NAME")]
    schemas: Vec<String>,

    /// Keep only this document type (repeatable, case-insensitive)
    #[arg(short = 't', long = "doc-type", value_name = "TYPE")]
    document_types: Vec<String>,

    /// Publication years: "<N", "<=N", ">N", ">=N", "N-M" or "N"
    #[arg(short, long, value_name = "RANGE", allow_hyphen_values = true)]
    years: Option<String>,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Output format: table, tsv, csv or json
    #[arg(short, long)]
    format: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Credit and collaboration metrics for each listed researcher
    Metrics {
        /// Corpus CSV files or glob patterns
        #[arg(required = true)]
        corpus: Vec<String>,

        /// Researcher CSV; the first column holds the author ID
        #[arg(short, long, value_name = "PATH")]
        researchers: PathBuf,

        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Export per-document, per-author credits
    Annotate {
        /// Corpus CSV files or glob patterns
        #[arg(required = true)]
        corpus: Vec<String>,

        /// Only credits of this author ID
        #[arg(short, long)]
        author: Option<u64>,

        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Report what normalization and selection keep from a corpus
    Inspect {
        /// Corpus CSV files or glob patterns
        #[arg(required = true)]
        corpus: Vec<String>,

        #[command(flatten)]
        selection: Selection,
    },
    /// Credit per byline position for an author count
    Model {
        /// Number of authors
        authors: usize,

        /// Schema to show (repeatable; default: config, then all)
        #[arg(short, long = "schema", value_name = "NAME")]
        schemas: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// One schema's credits for two author counts side by side
    Compare {
        schema: String,
        first: usize,
        second: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the available credit schemas
    Schemas,
    /// Create a config file interactively
    Init {
        /// Write the default config without prompting
        #[arg(long)]
        defaults: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "author-credit")]
#[command(about = "Author credit allocation and collaboration metrics for bibliographic corpora", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/author-credit/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Config error: {0:#}")]
    Config(anyhow::Error),

    #[error("Config errors:\n{}", format_errors(.0))]
    InvalidConfig(Vec<String>),

    #[error("{0:#}")]
    Usage(anyhow::Error),

    #[error("{0:#}")]
    Input(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidConfig(_) | CliError::Usage(_) => EXIT_CONFIG,
            CliError::Input(_) => EXIT_INPUT,
        }
    }
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start_time = Instant::now();
    match run(cli) {
        Ok(()) => {
            let elapsed = Duration::from_millis(start_time.elapsed().as_millis() as u64);
            info!(elapsed = %humantime::format_duration(elapsed), "finished");
            std::process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// RUST_LOG wins; otherwise warnings, plus this crate's debug output with --verbose.
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,author_credit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Schemas => {
            println!("{}", output::format_schema_list(output::should_use_colors()));
            Ok(())
        }
        Commands::Init { defaults } => run_init(cli.config, defaults),
        Commands::Metrics {
            corpus,
            researchers,
            selection,
            output: dest,
        } => {
            let settings = load_settings(cli.config, cli.threads, &selection, &dest)?;
            run_metrics(&corpus, &researchers, &settings, &dest, cli.verbose)
        }
        Commands::Annotate {
            corpus,
            author,
            selection,
            output: dest,
        } => {
            let settings = load_settings(cli.config, cli.threads, &selection, &dest)?;
            run_annotate(&corpus, author, &settings, &dest, cli.verbose)
        }
        Commands::Inspect { corpus, selection } => {
            let settings = load_settings(cli.config, cli.threads, &selection, &OutputArgs::default())?;
            let (available, summary) = inspect_corpus(&corpus, &settings)?;
            println!(
                "{}",
                output::format_corpus_summary(&summary, &available, output::should_use_colors())
            );
            Ok(())
        }
        Commands::Model {
            authors,
            schemas,
            output: dest,
        } => {
            let selection = Selection {
                schemas,
                ..Default::default()
            };
            let settings = load_settings(cli.config, cli.threads, &selection, &dest)?;
            let model = model_schemas(authors, &settings.schemas).map_err(CliError::Usage)?;
            let rendered = match settings.output {
                OutputFormat::Table => Ok(output::format_model_table(&model, use_colors(&dest))),
                OutputFormat::Json => serde_json::to_string_pretty(&model).map_err(anyhow::Error::from),
                delimited => output::format_model_delimited(&model, delimited.delimiter().unwrap_or(b',')),
            }
            .map_err(CliError::Input)?;
            output::emit(&rendered, dest.output.as_deref()).map_err(CliError::Input)
        }
        Commands::Compare {
            schema,
            first,
            second,
            output: dest,
        } => {
            let settings = load_settings(cli.config, cli.threads, &Selection::default(), &dest)?;
            let schema: Schema = schema
                .parse()
                .map_err(|e| CliError::Usage(anyhow::anyhow!("{} (run `author-credit schemas` for the list)", e)))?;
            let comparison = compare_author_counts(schema, first, second).map_err(CliError::Usage)?;
            let rendered = match settings.output {
                OutputFormat::Table => Ok(output::format_comparison_table(&comparison, use_colors(&dest))),
                OutputFormat::Json => serde_json::to_string_pretty(&comparison).map_err(anyhow::Error::from),
                delimited => output::format_comparison_delimited(&comparison, delimited.delimiter().unwrap_or(b',')),
            }
            .map_err(CliError::Input)?;
            output::emit(&rendered, dest.output.as_deref()).map_err(CliError::Input)
        }
    }
}

fn run_init(config_path: Option<PathBuf>, defaults: bool) -> Result<(), CliError> {
    if defaults {
        let path = init::write_default_config(config_path).map_err(CliError::Config)?;
        println!("Config written to {}", path.display());
        Ok(())
    } else {
        init::run_init_wizard(config_path).map_err(CliError::Config)
    }
}

/// Load the config file, fold CLI flags over it, validate, and size the
/// worker pool.
fn load_settings(
    config_path: Option<PathBuf>,
    threads: Option<usize>,
    selection: &Selection,
    dest: &OutputArgs,
) -> Result<Settings, CliError> {
    let mut config = config::load_config(config_path).map_err(CliError::Config)?;
    apply_overrides(&mut config, threads, selection, dest);
    let settings = validate_config(&config).map_err(CliError::InvalidConfig)?;

    if let Some(threads) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::Config(anyhow::anyhow!("Failed to start {} worker threads: {}", threads, e)))?;
    }
    Ok(settings)
}

fn apply_overrides(config: &mut Config, threads: Option<usize>, selection: &Selection, dest: &OutputArgs) {
    if !selection.schemas.is_empty() {
        config.schemas = Some(selection.schemas.clone());
    }
    if !selection.document_types.is_empty() {
        config.document_types = Some(selection.document_types.clone());
    }
    if selection.years.is_some() {
        config.years = selection.years.clone();
    }
    if threads.is_some() {
        config.threads = threads;
    }
    if dest.format.is_some() {
        config.output = dest.format.clone();
    }
}

fn use_colors(dest: &OutputArgs) -> bool {
    dest.output.is_none() && output::should_use_colors()
}

/// Read, normalize and select the corpus.
/// Read and normalize every corpus file; no selection yet.
fn load_normalized(patterns: &[String], settings: &Settings) -> Result<(Vec<Document>, RunSummary), CliError> {
    let paths = expand_corpus_paths(patterns).map_err(CliError::Input)?;
    let records = read_corpus(&paths, &settings.columns).map_err(CliError::Input)?;
    let normalized = normalize_corpus(records, &settings.columns.author_id_delimiter);

    let summary = RunSummary {
        corpus_files: paths.iter().map(|p| p.display().to_string()).collect(),
        normalize: normalized.report,
        ..Default::default()
    };
    Ok((normalized.documents, summary))
}

fn load_documents(patterns: &[String], settings: &Settings) -> Result<(Vec<Document>, RunSummary), CliError> {
    let (documents, mut summary) = load_normalized(patterns, settings)?;
    let (documents, filter) = settings.filter.apply(documents);
    summary.filter = filter;
    Ok((documents, summary))
}

/// Types and years are summarized over the whole normalized corpus, so they
/// show what a selection can choose from; the summary records what it kept.
fn inspect_corpus(patterns: &[String], settings: &Settings) -> Result<(CorpusSummary, RunSummary), CliError> {
    let (documents, mut summary) = load_normalized(patterns, settings)?;
    let available = summarize(&documents);
    let (_, filter) = settings.filter.apply(documents);
    summary.filter = filter;
    Ok((available, summary))
}

fn run_metrics(
    patterns: &[String],
    researchers_path: &Path,
    settings: &Settings,
    dest: &OutputArgs,
    verbose: bool,
) -> Result<(), CliError> {
    let (documents, mut summary) = load_documents(patterns, settings)?;
    let researchers = read_researchers(researchers_path).map_err(CliError::Input)?;
    summary.researchers_skipped = researchers.skipped;

    let corpus = annotate_corpus(documents, &settings.schemas);
    summary.schema_failures = corpus.failure_counts();

    let entries = dedup_researchers(researchers.entries);
    let metrics = aggregate_researchers(&entries, &corpus);

    if verbose {
        eprintln!("{}", output::format_pipeline_summary(&summary));
    }

    let report = MetricsReport {
        id_column: &researchers.id_column,
        passthrough_headers: &researchers.passthrough_headers,
        schemas: corpus.schemas(),
        metrics: &metrics,
        summary: &summary,
    };
    let rendered = output::format_metrics(&report, settings.output, use_colors(dest)).map_err(CliError::Input)?;
    output::emit(&rendered, dest.output.as_deref()).map_err(CliError::Input)
}

fn run_annotate(
    patterns: &[String],
    author: Option<u64>,
    settings: &Settings,
    dest: &OutputArgs,
    verbose: bool,
) -> Result<(), CliError> {
    let (documents, mut summary) = load_documents(patterns, settings)?;
    let corpus = annotate_corpus(documents, &settings.schemas);
    summary.schema_failures = corpus.failure_counts();

    if verbose {
        eprintln!("{}", output::format_pipeline_summary(&summary));
    }

    let rendered = output::format_annotations(&corpus, author, &summary, settings.output, use_colors(dest))
        .map_err(CliError::Input)?;
    output::emit(&rendered, dest.output.as_deref()).map_err(CliError::Input)
}
