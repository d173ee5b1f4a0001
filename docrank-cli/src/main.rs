//! DocRank Entry Point
//!
//! Ranks the sections of a document collection for the persona and task in
//! its `challenge1b_input.json` and writes `challenge1b_output.json`.

use clap::Parser;
use docrank_cli::{Collection, EmbedderBackend, Pipeline, PipelineResult, Settings, SettingsOverrides};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docrank")]
#[command(about = "Persona-driven section ranking for document collections")]
#[command(version)]
struct Args {
    /// Collection directory containing challenge1b_input.json and PDFs/
    collection: PathBuf,

    /// Report path (default: <COLLECTION>/challenge1b_output.json)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Embedding backend
    #[arg(long, value_enum)]
    embedder: Option<EmbedderBackend>,

    /// Model name for the fastembed backend
    #[arg(long)]
    model: Option<String>,

    /// Chunks averaged per section
    #[arg(long)]
    top_k: Option<usize>,

    /// Top sections mined for snippets
    #[arg(long)]
    top_n: Option<usize>,

    /// Documents processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Time budget for the whole run, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_filter = if args.verbose {
        "docrank=debug,docrank_cli=debug,docrank_core=debug"
    } else {
        "docrank=info,docrank_cli=info,docrank_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = Instant::now();
    match run(args).await {
        Ok(output) => {
            tracing::info!("Output written to {}", output.display());
            println!(
                "Total execution time: {:.2} seconds",
                start.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> PipelineResult<PathBuf> {
    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply(SettingsOverrides {
        embedder: args.embedder,
        model: args.model,
        top_k: args.top_k,
        top_n: args.top_n,
        workers: args.workers,
        timeout_secs: args.timeout,
    });

    let collection = Collection::open(&args.collection)?;
    tracing::info!("Processing collection {}", collection.root().display());

    let pipeline = Pipeline::new(settings)?;
    let report = pipeline.run(&collection).await?;

    let output = args
        .output
        .unwrap_or_else(|| collection.default_output_path());
    report.write_to_file(&output)?;
    Ok(output)
}
