use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{sentence_texts, TestFixture};

fn run_vigencia(input: &Path, fixture: &TestFixture, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vigencia"))
        .arg(input)
        .arg("--output-dir")
        .arg(fixture.output_dir())
        .arg("--stats-out")
        .arg(fixture.output_dir().join("run_stats.json"))
        .arg("--no-progress")
        .args(extra)
        .output()
        .expect("Failed to run vigencia")
}

/// Batch run over a directory writes candidates files, stats and a summary
#[test]
fn test_cli_directory_run() {
    let fixture = TestFixture::new();
    let input = fixture.root_path.join("docs");
    let notice = fixture.create_document("docs/notice.json", &paged_notice());
    let contract = fixture.create_document("docs/nested/contract.json", &paragraph_contract());
    let irrelevant = fixture.create_document("docs/irrelevant.json", &irrelevant_document());

    let output = run_vigencia(&input, &fixture, &[]);
    assert!(output.status.success(), "vigencia failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2/3 documents with candidates"), "unexpected summary: {stdout}");

    let candidates = fixture.read_candidates(&notice);
    assert_eq!(candidates["doc_id"], json!("LA-2025-001"));
    assert_eq!(candidates["total_sentences"], json!(3));
    assert_eq!(candidates["source_file"], json!(notice.display().to_string()));
    assert_eq!(sentence_texts(&candidates), PAGED_NOTICE_SENTENCES);

    assert_eq!(fixture.read_candidates(&contract)["doc_id"], json!(17));
    assert!(!fixture.candidates_exists(&irrelevant));

    let stats: Value =
        serde_json::from_str(&fs::read_to_string(fixture.output_dir().join("run_stats.json")).unwrap()).unwrap();
    assert_eq!(stats["total_files"], json!(3));
    assert_eq!(stats["processed"], json!(3));
    assert_eq!(stats["failed"], json!(0));
    assert_eq!(stats["total_sentences"], json!(5));
    let file_stat = &stats["files"][0];
    for key in [
        "path",
        "chars_resolved",
        "sentences_found",
        "matches_found",
        "processing_time_ms",
        "status",
        "error",
        "candidates_file",
    ] {
        assert!(file_stat.get(key).is_some(), "missing {key} in file stats");
    }
}

/// Candidates files keep non-ASCII text verbatim and never carry spans
#[test]
fn test_cli_candidates_format() {
    let fixture = TestFixture::new();
    let doc = fixture.create_document("uno.json", &json!({"text": "Vigencia: 31 de diciembre de 2025, según cláusula."}));

    let output = run_vigencia(&doc, &fixture, &["--positional-matches"]);
    assert!(output.status.success());

    let raw = fs::read_to_string(fixture.candidates_path(&doc)).unwrap();
    assert!(raw.contains("según cláusula"));
    assert!(!raw.contains("span"));

    let candidates: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(candidates["doc_id"], json!("unknown"));
    let matches = candidates["sentences"][0]["matches"].as_array().unwrap();
    let categories: Vec<&str> = matches.iter().map(|m| m["category"].as_str().unwrap()).collect();
    assert_eq!(categories, ["full_name_flexible", "with_year"]);
}

/// Glob input only selects matching documents
#[test]
fn test_cli_glob_input() {
    let fixture = TestFixture::new();
    fixture.create_document("docs/a1.json", &json!({"text": "Hasta el 31/12."}));
    fixture.create_document("docs/b1.json", &json!({"text": "Hasta el 31/12."}));

    let pattern = fixture.root_path.join("docs").join("a*.json");
    let output = run_vigencia(&pattern, &fixture, &[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1/1 documents with candidates"));
}

/// A malformed document is reported as failed without stopping the run
#[test]
fn test_cli_malformed_document_does_not_abort() {
    let fixture = TestFixture::new();
    let input = fixture.root_path.join("docs");
    fixture.create_raw_file("docs/broken.json", b"{ \"text\": ");
    fixture.create_document("docs/good.json", &json!({"content": "Cierre al 31 de diciembre."}));

    let output = run_vigencia(&input, &fixture, &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stats: Value =
        serde_json::from_str(&fs::read_to_string(fixture.output_dir().join("run_stats.json")).unwrap()).unwrap();
    assert_eq!(stats["failed"], json!(1));
    assert_eq!(stats["processed"], json!(1));
    let broken = stats["files"].as_array().unwrap().iter().find(|f| f["status"] == json!("failed")).unwrap();
    assert!(broken["error"].as_str().unwrap().contains("Invalid JSON"));
}

/// With --fail-fast the same malformed document is fatal
#[test]
fn test_cli_fail_fast() {
    let fixture = TestFixture::new();
    let input = fixture.root_path.join("docs");
    fixture.create_raw_file("docs/broken.json", b"not json");

    let output = run_vigencia(&input, &fixture, &["--fail-fast"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_missing_input_is_fatal() {
    let fixture = TestFixture::new();
    let output = run_vigencia(&fixture.root_path.join("empty_dir_that_does_not_exist"), &fixture, &[]);
    assert!(!output.status.success());
}
