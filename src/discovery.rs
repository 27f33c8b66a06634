// WHY: Turns the CLI input (file, directory, or glob pattern) into a sorted list of documents
// Validation problems are reported per path; only fail_fast turns them into a hard error

use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::incremental::CANDIDATES_SUFFIX;

/// Configuration for document discovery behavior
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// Result of validating one discovered path
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// How an input argument is expanded into document paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Pattern(String),
    Directory(PathBuf),
    File(PathBuf),
}

impl InputKind {
    pub fn classify(input: &Path) -> Self {
        let text = input.to_string_lossy();
        if text.contains(['*', '?', '[']) {
            Self::Pattern(text.into_owned())
        } else if input.is_dir() {
            Self::Directory(input.to_path_buf())
        } else {
            Self::File(input.to_path_buf())
        }
    }
}

/// Whether a file name looks like an input document rather than one of our outputs
///
/// Hidden files are skipped, which keeps the restart log out of directory walks.
pub fn is_document_name(file_name: &str) -> bool {
    file_name.ends_with(".json") && !file_name.ends_with(CANDIDATES_SUFFIX) && !file_name.starts_with('.')
}

/// Discovers documents for `input` and returns an async stream of validated paths
///
/// Paths are yielded in sorted order so batch runs are deterministic.
pub fn discover_files(
    input: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    futures::stream::unfold(
        DiscoveryState::new(InputKind::classify(input.as_ref()), config),
        |mut state| async move { state.next_file().await.map(|result| (result, state)) },
    )
}

/// Internal state for discovery iteration
struct DiscoveryState {
    input: InputKind,
    config: DiscoveryConfig,
    pending: Option<std::vec::IntoIter<PathBuf>>,
}

impl DiscoveryState {
    fn new(input: InputKind, config: DiscoveryConfig) -> Self {
        Self {
            input,
            config,
            pending: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.pending.is_none() {
            let input = self.input.clone();
            let fail_fast = self.config.fail_fast;
            // Expansion walks the filesystem synchronously
            let expanded = tokio::task::spawn_blocking(move || expand_input(&input, fail_fast)).await;
            match expanded {
                Ok(Ok(mut paths)) => {
                    paths.sort();
                    paths.dedup();
                    info!("Discovery expanded input into {} candidate paths", paths.len());
                    self.pending = Some(paths.into_iter());
                }
                Ok(Err(e)) => {
                    self.pending = Some(Vec::new().into_iter());
                    return Some(Err(e));
                }
                Err(e) => {
                    self.pending = Some(Vec::new().into_iter());
                    return Some(Err(anyhow::anyhow!("Discovery task failed: {e}")));
                }
            }
        }

        let path = self.pending.as_mut()?.next()?;
        debug!("Found file: {}", path.display());
        Some(validate_file(path, &self.config).await)
    }
}

fn expand_input(input: &InputKind, fail_fast: bool) -> Result<Vec<PathBuf>> {
    match input {
        InputKind::Pattern(pattern) => {
            debug!("Expanding glob pattern: {}", pattern);
            let mut paths = Vec::new();
            for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) if fail_fast => return Err(anyhow::anyhow!("Glob iteration error: {e}")),
                    Err(e) => warn!("Glob iteration error (continuing): {}", e),
                }
            }
            Ok(paths)
        }
        InputKind::Directory(root) => {
            debug!("Walking directory: {}", root.display());
            let mut paths = Vec::new();
            for entry in WalkDir::new(root).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) if fail_fast => return Err(anyhow::anyhow!("Directory walk error: {e}")),
                    Err(e) => {
                        warn!("Directory walk error (continuing): {}", e);
                        continue;
                    }
                };
                if entry.file_type().is_file()
                    && entry.file_name().to_str().is_some_and(is_document_name)
                {
                    paths.push(entry.into_path());
                }
            }
            Ok(paths)
        }
        InputKind::File(path) => Ok(vec![path.clone()]),
    }
}

async fn validate_file(path: PathBuf, config: &DiscoveryConfig) -> Result<FileValidation> {
    let error = match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => None,
        Ok(_) => Some(format!("Path is not a file: {}", path.display())),
        Err(e) => {
            let error = format!("Cannot access file {}: {}", path.display(), e);
            if config.fail_fast {
                return Err(anyhow::anyhow!(error));
            }
            Some(error)
        }
    };

    if let Some(ref error) = error {
        warn!("{}", error);
    }
    Ok(FileValidation { path, error })
}

/// Collect all discovered files into a Vec for easier processing
pub async fn collect_discovered_files(
    input: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(input, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    let valid_count = files.iter().filter(|f| f.is_valid()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }
    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}
