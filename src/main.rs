use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use vigencia::discovery::{self, DiscoveryConfig, InputKind};
use vigencia::parallel_processing::{process_files_parallel, write_run_stats, ProcessingConfig};
use vigencia::{ExtractionPipeline, MatchOrder, PatternCatalog};

#[derive(Parser, Debug)]
#[command(name = "vigencia")]
#[command(about = "Extracts sentences referencing December 31st from JSON document representations")]
#[command(version)]
struct Args {
    /// Document file, directory to scan for *.json, or glob pattern
    input: PathBuf,

    /// Directory for *_candidates.json files and the restart log
    #[arg(long, default_value = "candidates")]
    output_dir: PathBuf,

    /// Reprocess documents already recorded as complete
    #[arg(long)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Documents processed concurrently
    #[arg(long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// Order each sentence's matches by position instead of by category
    #[arg(long)]
    positional_matches: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the summary
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!("Starting vigencia");
    info!(?args, "Parsed CLI arguments");

    // WHY: validate input exists early to fail fast with clear error
    let is_pattern = matches!(InputKind::classify(&args.input), InputKind::Pattern(_));
    if !is_pattern && !args.input.exists() {
        anyhow::bail!("Input does not exist: {}", args.input.display());
    }

    let catalog = Arc::new(PatternCatalog::new().context("Failed to build pattern catalog")?);
    let pipeline = Arc::new(ExtractionPipeline::new(catalog).context("Failed to build extraction pipeline")?);

    let discovered = discovery::collect_discovered_files(
        &args.input,
        DiscoveryConfig {
            fail_fast: args.fail_fast,
        },
    )
    .await?;
    if discovered.is_empty() {
        warn!("No documents found for input: {}", args.input.display());
    }

    let config = ProcessingConfig {
        output_dir: args.output_dir,
        fail_fast: args.fail_fast,
        overwrite_all: args.overwrite_all,
        jobs: args.jobs,
        show_progress: !args.no_progress,
        match_order: if args.positional_matches {
            MatchOrder::Positional
        } else {
            MatchOrder::Discovery
        },
    };

    let run_stats = process_files_parallel(&discovered, pipeline, &config).await?;
    write_run_stats(&args.stats_out, &run_stats).await?;

    println!("{}", run_stats.summary_line());
    println!(
        "Processed: {}, skipped: {}, failed: {}, sentences: {}",
        run_stats.processed, run_stats.skipped, run_stats.failed, run_stats.total_sentences
    );
    println!("Candidates written to: {}", config.output_dir.display());

    Ok(())
}
