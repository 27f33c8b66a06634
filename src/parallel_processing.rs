// WHY: Bounded-concurrency batch driver over many documents
// One failed document never affects the others unless fail_fast is set

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::dedup::MatchOrder;
use crate::discovery::FileValidation;
use crate::incremental::{generate_candidates_path, write_candidates_file, CandidatesFile};
use crate::pipeline::ExtractionPipeline;
use crate::reader::{DocumentReader, ReaderConfig};
use crate::restart_log::{should_process_file, RestartLog};

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub output_dir: PathBuf,
    pub fail_fast: bool,
    pub overwrite_all: bool,
    /// Documents processed concurrently
    pub jobs: usize,
    pub show_progress: bool,
    pub match_order: MatchOrder,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("candidates"),
            fail_fast: false,
            overwrite_all: false,
            jobs: num_cpus::get(),
            show_progress: true,
            match_order: MatchOrder::Discovery,
        }
    }
}

/// Outcome of one document
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Skipped,
    Failed,
}

/// Per-document processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    /// Characters in the resolved document text
    pub chars_resolved: u64,
    pub sentences_found: u64,
    pub matches_found: u64,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    pub error: Option<String>,
    /// Written (or, when skipped, previously written) candidates file
    pub candidates_file: Option<String>,
}

impl FileStats {
    fn empty(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.display().to_string(),
            chars_resolved: 0,
            sentences_found: 0,
            matches_found: 0,
            processing_time_ms: 0,
            status,
            error: None,
            candidates_file: None,
        }
    }

    fn failed(path: &Path, error: String, started: Instant) -> Self {
        Self {
            error: Some(error),
            processing_time_ms: started.elapsed().as_millis() as u64,
            ..Self::empty(path, FileStatus::Failed)
        }
    }
}

/// Statistics for a whole batch run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    pub run_start_utc: String,
    pub run_duration_ms: u64,
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_sentences: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    fn from_files(run_start_utc: String, started: Instant, mut files: Vec<FileStats>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let count = |status| files.iter().filter(|f| f.status == status).count();
        Self {
            run_start_utc,
            run_duration_ms: started.elapsed().as_millis() as u64,
            total_files: files.len(),
            processed: count(FileStatus::Success),
            skipped: count(FileStatus::Skipped),
            failed: count(FileStatus::Failed),
            total_sentences: files.iter().map(|f| f.sentences_found).sum(),
            files,
        }
    }

    /// Documents that have a candidates file after the run
    pub fn documents_with_candidates(&self) -> usize {
        self.files.iter().filter(|f| f.candidates_file.is_some()).count()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}/{} documents with candidates",
            self.documents_with_candidates(),
            self.total_files
        )
    }
}

/// Write run statistics as pretty-printed JSON
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let content = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write stats file {}", path.display()))?;
    info!("Run statistics written to {}", path.display());
    Ok(())
}

/// Progress bar that is a no-op when disabled
struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    fn new(enabled: bool, total_files: u64) -> Self {
        if !enabled {
            return Self { progress_bar: None };
        }
        let pb = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} documents {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self {
            progress_bar: Some(pb),
        }
    }

    fn file_completed(&self, path: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(path.to_string());
            pb.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("done");
        }
    }
}

/// Process every discovered document and return run statistics
///
/// Invalid discovery entries are reported as failed. Completed documents
/// recorded in the restart log are skipped unless `overwrite_all` is set.
pub async fn process_files_parallel(
    files: &[FileValidation],
    pipeline: Arc<ExtractionPipeline>,
    config: &ProcessingConfig,
) -> Result<RunStats> {
    let run_start_utc = chrono::Utc::now().to_rfc3339();
    let started = Instant::now();

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;

    let mut restart_log = RestartLog::load(&config.output_dir).await;
    if !config.overwrite_all {
        let dropped = restart_log.verify_completed_files(&config.output_dir).await?;
        if !dropped.is_empty() {
            info!("Dropped {} stale restart log entries", dropped.len());
        }
    }

    let pipeline = Arc::new(pipeline.as_ref().clone().with_match_order(config.match_order));
    // Workers read a snapshot; completions are recorded in `restart_log`
    let restart_snapshot = Arc::new(restart_log.clone());
    let progress = ProgressReporter::new(config.show_progress, files.len() as u64);
    info!("Processing {} documents with {} jobs", files.len(), config.jobs.max(1));

    let mut results = stream::iter(files.iter().cloned())
        .map(|file| {
            let pipeline = Arc::clone(&pipeline);
            let restart_snapshot = Arc::clone(&restart_snapshot);
            async move { process_file(file, pipeline, &restart_snapshot, config).await }
        })
        .buffer_unordered(config.jobs.max(1));

    let mut file_stats = Vec::with_capacity(files.len());

    while let Some(stats) = results.next().await {
        progress.file_completed(&stats.path);
        match stats.status {
            FileStatus::Success => {
                // Persisted per document so an interrupted run can resume
                restart_log.mark_completed(Path::new(&stats.path), stats.sentences_found as usize);
                if let Err(e) = restart_log.save(&config.output_dir).await {
                    warn!("Failed to update restart log after {}: {:#}", stats.path, e);
                }
            }
            FileStatus::Failed if config.fail_fast => {
                progress.finish();
                anyhow::bail!(
                    "Processing failed for {}: {}",
                    stats.path,
                    stats.error.as_deref().unwrap_or("unknown error")
                );
            }
            _ => {}
        }
        file_stats.push(stats);
    }
    progress.finish();

    restart_log.save(&config.output_dir).await?;
    let run_stats = RunStats::from_files(run_start_utc, started, file_stats);
    info!(
        "Batch complete: {} processed, {} skipped, {} failed, {} sentences",
        run_stats.processed, run_stats.skipped, run_stats.failed, run_stats.total_sentences
    );
    Ok(run_stats)
}

async fn process_file(
    file: FileValidation,
    pipeline: Arc<ExtractionPipeline>,
    restart_log: &RestartLog,
    config: &ProcessingConfig,
) -> FileStats {
    let started = Instant::now();
    let path = file.path;

    if let Some(error) = file.error {
        return FileStats::failed(&path, error, started);
    }

    if !should_process_file(&path, &config.output_dir, restart_log, config.overwrite_all) {
        debug!("Skipping completed document: {}", path.display());
        let sentences = restart_log.sentence_count(&path).unwrap_or(0);
        let mut stats = FileStats::empty(&path, FileStatus::Skipped);
        stats.sentences_found = sentences as u64;
        if sentences > 0 {
            stats.candidates_file = Some(generate_candidates_path(&path, &config.output_dir).display().to_string());
        }
        return stats;
    }

    let reader = DocumentReader::new(ReaderConfig { fail_fast: false });
    let document = match reader.read_document(&path).await {
        Ok((Some(document), _)) => document,
        Ok((None, read_stats)) => {
            let error = read_stats.read_error.unwrap_or_else(|| "document could not be read".to_string());
            return FileStats::failed(&path, error, started);
        }
        Err(e) => return FileStats::failed(&path, e.to_string(), started),
    };

    // Extraction is CPU-bound
    let extracted = tokio::task::spawn_blocking(move || {
        let text = pipeline.resolve_text(&document);
        let result = pipeline.extract_text(&text);
        (document, text.chars().count(), result)
    })
    .await;
    let (document, chars_resolved, result) = match extracted {
        Ok(extracted) => extracted,
        Err(e) => return FileStats::failed(&path, format!("Extraction task failed: {e}"), started),
    };

    let mut stats = FileStats::empty(&path, FileStatus::Success);
    stats.chars_resolved = chars_resolved as u64;
    stats.sentences_found = result.total_sentences_found as u64;
    stats.matches_found = result.match_count() as u64;

    if !result.is_empty() {
        let candidates_path = generate_candidates_path(&path, &config.output_dir);
        let candidates = CandidatesFile::new(&path, &document, result);
        if let Err(e) = write_candidates_file(&candidates_path, &candidates).await {
            warn!("Failed to write candidates for {}: {:#}", path.display(), e);
            return FileStats::failed(&path, format!("{e:#}"), started);
        }
        stats.candidates_file = Some(candidates_path.display().to_string());
    }

    stats.processing_time_ms = started.elapsed().as_millis() as u64;
    debug!(
        "Processed {}: {} sentences, {} matches in {}ms",
        path.display(),
        stats.sentences_found,
        stats.matches_found,
        stats.processing_time_ms
    );
    stats
}
