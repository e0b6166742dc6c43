mod batch;
mod config;
mod dedup;
mod metrics;
mod sink;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extract::{CidMapping, Extractor, UrgencyPolicy};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::batch::{BatchProcessor, BatchResult};
use crate::config::{AppConfig, OutputFormat, PageScope};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::sink::{JsonSink, RecordSink, WriteMode, XlsxSink};

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Builds the inpatient census spreadsheet from hospitalization report PDFs")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from PDFs (files or folders) and write the census
    Run {
        /// PDF files or folders containing PDFs
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Add rows to an existing output instead of replacing it
        #[arg(long)]
        append: bool,
        /// Output file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Only read the first page of each document
        #[arg(long)]
        first_page_only: bool,
        /// CID reference table (semicolon-delimited, Latin-1)
        #[arg(long)]
        cid_table: Option<PathBuf>,
        /// uti_presence or uti_before_ward
        #[arg(long)]
        urgency_policy: Option<UrgencyPolicy>,
    },
    /// Print the resolved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env()?;

    match cli.command {
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Run {
            inputs,
            append,
            output,
            format,
            first_page_only,
            cid_table,
            urgency_policy,
        } => {
            if append {
                config.output.mode = WriteMode::Append;
            }
            if let Some(output) = output {
                config.output.path = output;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if first_page_only {
                config.pages = PageScope::FirstPage;
            }
            if let Some(path) = cid_table {
                config.cid_table.path = path;
            }
            if let Some(policy) = urgency_policy {
                config.extraction.urgency_policy = policy;
            }
            run(&config, &inputs).await.inspect_err(|e| {
                error!(error = %format!("{e:#}"), "Run aborted");
            })
        }
    }
}

/// `RUST_LOG`, read after `.env` has been loaded; `info` when unset.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: &AppConfig, inputs: &[PathBuf]) -> Result<()> {
    // Reference data first: nothing is processed without it.
    let cids = CidMapping::load(
        &config.cid_table.path,
        &config.cid_table.code_column,
        &config.cid_table.description_column,
    )
    .context("Cannot start without the CID table")?;

    let documents = ingest::resolve_inputs(inputs)?;
    info!(
        documents = documents.len(),
        policy = ?config.extraction.urgency_policy,
        "Starting batch"
    );

    let extractor = Extractor::new(&config.extraction, cids);
    let metrics = Metrics::new();
    let processor = BatchProcessor::new(&extractor, config.pages, metrics.clone());
    let result = processor.run(&documents).await;

    if result.records.is_empty() {
        println!("Nenhum dado foi extraído dos PDFs.");
    } else {
        let sink: Box<dyn RecordSink> = match config.output.format {
            OutputFormat::Xlsx => Box::new(XlsxSink::new(&config.output.path)),
            OutputFormat::Json => Box::new(JsonSink::new(&config.output.path)),
        };
        let total = sink.write(&result.records, config.output.mode)?;
        println!(
            "{} registro(s) gravado(s) em {} ({} linha(s) no total).",
            result.records.len(),
            sink.path().display(),
            total
        );
    }

    print_summary(&result, &metrics.snapshot());
    Ok(())
}

fn print_summary(result: &BatchResult, snapshot: &MetricsSnapshot) {
    println!("\n=== RESUMO ===\n");
    for outcome in &result.outcomes {
        match &outcome.error {
            None => println!("  ✔ {} — {} registro(s)", outcome.path.display(), outcome.records),
            Some(error) => println!("  ✘ {} — {}", outcome.path.display(), error),
        }
    }
    println!();
    println!("  Documentos processados: {}", snapshot.documents_processed);
    println!("  Documentos com erro: {}", snapshot.documents_failed);
    println!("  Páginas lidas: {}", snapshot.pages_seen);
    println!("  Páginas sem texto: {}", snapshot.pages_skipped);
    println!("  Registros montados: {}", snapshot.records_assembled);
    println!("  Duplicados removidos: {}", snapshot.duplicates_dropped);
    println!("  Campos não resolvidos: {}", snapshot.unresolved_fields);
    println!("  Tempo médio de extração: {:.2} ms", snapshot.avg_extract_time_ms);
}
