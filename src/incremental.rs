// WHY: Naming, writing and reading of per-document candidates files
// Shared by the batch driver, the restart log and the selection prompt tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::pipeline::{ExtractionResult, SentenceResult};

/// File name suffix of every candidates file
pub const CANDIDATES_SUFFIX: &str = "_candidates.json";

/// Identifier written when a document carries no `doc_id`
pub const UNKNOWN_DOC_ID: &str = "unknown";

/// Hex digits of the source path hash kept in candidates file names
const PATH_HASH_LEN: usize = 12;

/// Generate the candidates file path for a source document
///
/// `<output_dir>/<file stem>_<path hash>_candidates.json`. The hash covers the
/// whole source path, so documents sharing a file name in different
/// directories never write to the same candidates file.
pub fn generate_candidates_path(source_path: &Path, output_dir: &Path) -> PathBuf {
    let file_stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| UNKNOWN_DOC_ID.into());
    let mut hasher = Sha256::new();
    hasher.update(source_path.to_string_lossy().as_bytes());
    let path_hash = format!("{:x}", hasher.finalize());
    output_dir.join(format!("{file_stem}_{}{CANDIDATES_SUFFIX}", &path_hash[..PATH_HASH_LEN]))
}

/// Check if the candidates file for a source document exists
pub fn candidates_file_exists(source_path: &Path, output_dir: &Path) -> bool {
    generate_candidates_path(source_path, output_dir).exists()
}

/// On-disk form of one document's extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatesFile {
    pub source_file: String,
    /// The document's `doc_id` verbatim (any JSON type), or `"unknown"`
    pub doc_id: Value,
    pub total_sentences: usize,
    pub sentences: Vec<SentenceResult>,
}

impl CandidatesFile {
    pub fn new(source_path: &Path, document: &Value, result: ExtractionResult) -> Self {
        let doc_id = document
            .get("doc_id")
            .cloned()
            .unwrap_or_else(|| Value::String(UNKNOWN_DOC_ID.to_string()));
        Self {
            source_file: source_path.display().to_string(),
            doc_id,
            total_sentences: result.total_sentences_found,
            sentences: result.sentences,
        }
    }

    /// Sentence strings in document order
    pub fn sentence_texts(&self) -> impl Iterator<Item = &str> {
        self.sentences.iter().map(|s| s.sentence.as_str())
    }
}

/// Write a candidates file, pretty-printed with non-ASCII kept verbatim
pub async fn write_candidates_file(path: &Path, candidates: &CandidatesFile) -> Result<()> {
    let content = serde_json::to_vec_pretty(candidates)?;
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create candidates file {}", path.display()))?;
    file.write_all(&content).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

/// Read a candidates file written by [`write_candidates_file`]
pub async fn read_candidates_file(path: &Path) -> Result<CandidatesFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read candidates file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Malformed candidates file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::Match;
    use crate::patterns::Category;
    use crate::span::Span;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_result() -> ExtractionResult {
        ExtractionResult {
            total_sentences_found: 1,
            sentences: vec![SentenceResult {
                sentence: "Válido hasta el 31 de diciembre.".to_string(),
                matches: vec![Match {
                    text: "31 de diciembre".to_string(),
                    category: Category::FullNameFlexible,
                    span: Span::new(17, 32),
                }],
                span: Span::new(0, 34),
            }],
        }
    }

    #[test]
    fn test_candidates_path() {
        let path = generate_candidates_path(Path::new("/data/in/contrato-7.json"), Path::new("out"));
        assert_eq!(path.parent(), Some(Path::new("out")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("contrato-7_"));
        assert!(name.ends_with(CANDIDATES_SUFFIX));
        assert_eq!(name.len(), "contrato-7_".len() + PATH_HASH_LEN + CANDIDATES_SUFFIX.len());

        // Stable for the same source
        assert_eq!(path, generate_candidates_path(Path::new("/data/in/contrato-7.json"), Path::new("out")));
    }

    #[test]
    fn test_same_file_name_in_different_directories() {
        let output_dir = Path::new("out");
        let top = generate_candidates_path(Path::new("docs/a.json"), output_dir);
        let nested = generate_candidates_path(Path::new("docs/sub/a.json"), output_dir);
        assert_ne!(top, nested);
    }

    #[test]
    fn test_doc_id_defaults_to_unknown() {
        let with_id = CandidatesFile::new(Path::new("a.json"), &json!({"doc_id": 42}), sample_result());
        assert_eq!(with_id.doc_id, json!(42));

        let without_id = CandidatesFile::new(Path::new("a.json"), &json!({"text": "x"}), sample_result());
        assert_eq!(without_id.doc_id, json!("unknown"));
        assert_eq!(without_id.total_sentences, 1);
    }

    #[tokio::test]
    async fn test_write_then_read_keeps_non_ascii() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("doc.json");
        let path = generate_candidates_path(&source, temp_dir.path());
        let candidates = CandidatesFile::new(&source, &json!({"doc_id": "abc"}), sample_result());

        write_candidates_file(&path, &candidates).await.unwrap();
        assert!(candidates_file_exists(&source, temp_dir.path()));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Válido"));
        assert!(raw.contains("\"category\": \"full_name_flexible\""));
        assert!(!raw.contains("span"));

        let loaded = read_candidates_file(&path).await.unwrap();
        assert_eq!(loaded.sentence_texts().collect::<Vec<_>>(), ["Válido hasta el 31 de diciembre."]);
        assert_eq!(loaded.doc_id, json!("abc"));
    }

    #[tokio::test]
    async fn test_read_missing_file_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_candidates_file(&temp_dir.path().join("nope_candidates.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read candidates file"));
    }
}
