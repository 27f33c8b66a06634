// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for creating temporary directories with JSON documents
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        Self { temp_dir, root_path }
    }

    /// Write a JSON document under the fixture root
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, document: &Value) -> PathBuf {
        let content = serde_json::to_string_pretty(document).expect("Failed to serialize document");
        self.create_raw_file(relative_path, content.as_bytes())
    }

    /// Write arbitrary bytes, for malformed-input tests
    pub fn create_raw_file<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Output directory used by batch runs in tests
    pub fn output_dir(&self) -> PathBuf {
        self.root_path.join("out")
    }

    /// Candidates file path the batch run writes for a source document
    pub fn candidates_path<P: AsRef<Path>>(&self, source_path: P) -> PathBuf {
        vigencia::generate_candidates_path(source_path.as_ref(), &self.output_dir())
    }

    pub fn candidates_exists<P: AsRef<Path>>(&self, source_path: P) -> bool {
        self.candidates_path(source_path).exists()
    }

    /// Parse the candidates file for a source document
    pub fn read_candidates<P: AsRef<Path>>(&self, source_path: P) -> Value {
        let content = fs::read_to_string(self.candidates_path(source_path)).expect("Failed to read candidates file");
        serde_json::from_str(&content).expect("Candidates file is not valid JSON")
    }

    pub fn restart_log_path(&self) -> PathBuf {
        self.output_dir().join(".vigencia_restart.json")
    }
}

/// Sentence strings of a serialized extraction result or candidates file
pub fn sentence_texts(value: &Value) -> Vec<String> {
    value["sentences"]
        .as_array()
        .expect("sentences should be an array")
        .iter()
        .map(|s| s["sentence"].as_str().expect("sentence should be a string").to_string())
        .collect()
}
