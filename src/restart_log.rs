// WHY: Lets an interrupted batch run resume without reprocessing finished documents
// Records each processed path with its sentence count under the output directory

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::incremental::generate_candidates_path;

const RESTART_LOG_NAME: &str = ".vigencia_restart.json";

/// Tracks successfully processed documents and how many sentences each produced
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RestartLog {
    /// Source path -> sentences written to its candidates file
    completed_files: BTreeMap<String, usize>,
    /// Seconds since the Unix epoch of the last update
    last_updated: u64,
}

impl RestartLog {
    /// Load the restart log from `output_dir`, empty if missing or unreadable
    pub async fn load(output_dir: &Path) -> Self {
        let log_path = Self::get_log_path(output_dir);
        match fs::read_to_string(&log_path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed restart log {}: {}", log_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save the restart log into `output_dir`
    ///
    /// Written to a temporary file and renamed, so an interrupted save never
    /// leaves a truncated log behind.
    pub async fn save(&self, output_dir: &Path) -> Result<()> {
        let log_path = Self::get_log_path(output_dir);
        let tmp_path = output_dir.join(format!("{RESTART_LOG_NAME}.tmp"));
        let content = serde_json::to_string_pretty(self)?;
        fs::create_dir_all(output_dir).await?;
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &log_path).await?;
        Ok(())
    }

    pub fn is_completed(&self, file_path: &Path) -> bool {
        self.completed_files.contains_key(&path_key(file_path))
    }

    /// Sentences recorded for a completed document
    pub fn sentence_count(&self, file_path: &Path) -> Option<usize> {
        self.completed_files.get(&path_key(file_path)).copied()
    }

    pub fn mark_completed(&mut self, file_path: &Path, sentences: usize) {
        self.completed_files.insert(path_key(file_path), sentences);
        self.touch();
    }

    pub fn completed_count(&self) -> usize {
        self.completed_files.len()
    }

    fn touch(&mut self) {
        self.last_updated = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
    }

    fn get_log_path(output_dir: &Path) -> PathBuf {
        output_dir.join(RESTART_LOG_NAME)
    }

    /// Drop entries whose source vanished or whose candidates file is missing
    ///
    /// Returns the dropped paths.
    pub async fn verify_completed_files(&mut self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut invalid_files = Vec::new();
        let mut valid_files = BTreeMap::new();

        for (file_path_str, &sentences) in &self.completed_files {
            let file_path = PathBuf::from(file_path_str);
            let source_exists = fs::try_exists(&file_path).await.unwrap_or(false);
            let output_ok = sentences == 0
                || fs::try_exists(generate_candidates_path(&file_path, output_dir))
                    .await
                    .unwrap_or(false);

            if source_exists && output_ok {
                valid_files.insert(file_path_str.clone(), sentences);
            } else {
                invalid_files.push(file_path);
            }
        }

        self.completed_files = valid_files;
        Ok(invalid_files)
    }
}

fn path_key(file_path: &Path) -> String {
    file_path.to_string_lossy().to_string()
}

/// Check if a document should be processed given the restart log and overwrite flag
///
/// A completed document is skipped when it produced no sentences, or when its
/// candidates file is still present.
pub fn should_process_file(
    file_path: &Path,
    output_dir: &Path,
    restart_log: &RestartLog,
    overwrite_all: bool,
) -> bool {
    if overwrite_all {
        return true;
    }
    match restart_log.sentence_count(file_path) {
        Some(0) => false,
        Some(_) => !generate_candidates_path(file_path, output_dir).exists(),
        None => true,
    }
}
