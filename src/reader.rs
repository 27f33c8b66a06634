use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration for document reading behavior
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// Statistics for one document read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Async reader that loads a document file and parses it as JSON
pub struct DocumentReader {
    config: ReaderConfig,
}

impl DocumentReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read and parse one document
    ///
    /// Without `fail_fast`, an unreadable or malformed file yields `None` with
    /// the error recorded in the returned stats.
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P) -> Result<(Option<Value>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        debug!("Starting async read of document: {}", path.display());

        let mut stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read: 0,
            duration_ms: 0,
            read_error: None,
        };

        let parsed = match tokio::fs::read(path).await {
            Ok(bytes) => {
                stats.bytes_read = bytes.len() as u64;
                serde_json::from_slice::<Value>(&bytes)
                    .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))
            }
            Err(e) => Err(format!("Failed to read file {}: {}", path.display(), e)),
        };
        stats.duration_ms = start_time.elapsed().as_millis() as u64;

        match parsed {
            Ok(document) => {
                info!(
                    "Read {}: {} bytes in {}ms",
                    path.display(),
                    stats.bytes_read,
                    stats.duration_ms
                );
                Ok((Some(document), stats))
            }
            Err(error_msg) => {
                warn!("{}", error_msg);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                stats.read_error = Some(error_msg);
                Ok((None, stats))
            }
        }
    }
}

/// Convenience function for reading a single document with default configuration
pub async fn read_document_async<P: AsRef<Path>>(file_path: P) -> Result<Value> {
    let path = file_path.as_ref();
    let reader = DocumentReader::new(ReaderConfig { fail_fast: true });
    let (document, _stats) = reader.read_document(path).await?;
    document.ok_or_else(|| anyhow::anyhow!("No document read from {}", path.display()))
}
