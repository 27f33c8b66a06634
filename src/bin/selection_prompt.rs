// Semantic-filter prompt rendering utility
// Reads one or more candidates files and prints the prompt an external filter would receive

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use vigencia::incremental::read_candidates_file;
use vigencia::selection::{SelectionRequest, SYSTEM_MESSAGE};

#[derive(Parser, Debug)]
#[command(name = "selection_prompt")]
#[command(about = "Render the sentence-selection prompt for candidates files")]
struct Args {
    /// *_candidates.json files; their sentences are merged into one request
    #[arg(required = true)]
    candidates: Vec<PathBuf>,

    /// Print the system message before the prompt
    #[arg(long)]
    with_system: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();

    let mut files = Vec::with_capacity(args.candidates.len());
    for path in &args.candidates {
        files.push(read_candidates_file(path).await?);
    }

    let request = SelectionRequest::from_candidates(&files);
    info!(
        "Rendering prompt for {} unique sentences from {} files",
        request.len(),
        files.len()
    );

    if args.with_system {
        println!("{SYSTEM_MESSAGE}\n");
    }
    println!("{}", request.render_prompt());
    Ok(())
}
