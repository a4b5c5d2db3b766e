//! Usage accounting tests

use ollama_usage_client::{UsageRecorder, UsageTotals};
use serde_json::json;
use tempfile::TempDir;

fn recorder_in(dir: &TempDir) -> UsageRecorder {
    UsageRecorder::new(dir.path().join(".llm_usage_stats.json"))
}

fn read_file(recorder: &UsageRecorder) -> serde_json::Value {
    let content = std::fs::read_to_string(recorder.path()).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_record_adds_to_existing_totals() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), r#"{"prompt_eval_count": 10, "eval_count": 20}"#).unwrap();

    let totals = recorder
        .record(&json!({"response": "x", "prompt_eval_count": 3, "eval_count": 4}))
        .await
        .unwrap();

    assert_eq!(totals.prompt_eval_count, 13);
    assert_eq!(totals.eval_count, 24);
    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 13, "eval_count": 24}));
}

#[tokio::test]
async fn test_record_adds_to_float_totals() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), r#"{"prompt_eval_count": 10.0, "eval_count": 20}"#).unwrap();

    recorder.record(&json!({"prompt_eval_count": 3, "eval_count": 4})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 13, "eval_count": 24}));
}

#[tokio::test]
async fn test_record_with_missing_file() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);

    recorder.record(&json!({"prompt_eval_count": 3, "eval_count": 4})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 3, "eval_count": 4}));
}

#[tokio::test]
async fn test_record_with_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), "{not json").unwrap();

    recorder.record(&json!({"prompt_eval_count": 3, "eval_count": 4})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 3, "eval_count": 4}));
}

#[tokio::test]
async fn test_record_with_wrong_shape_file() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), "[1, 2, 3]").unwrap();

    recorder.record(&json!({"prompt_eval_count": 3, "eval_count": 4})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 3, "eval_count": 4}));
}

#[tokio::test]
async fn test_record_preserves_other_fields() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), r#"{"prompt_eval_count": 1, "eval_count": 1, "job": "nightly"}"#).unwrap();

    recorder.record(&json!({"prompt_eval_count": 1, "eval_count": 1})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 2, "eval_count": 2, "job": "nightly"}));
}

#[tokio::test]
async fn test_record_without_counters_writes_unchanged_totals() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);
    std::fs::write(recorder.path(), r#"{"prompt_eval_count": 4, "eval_count": 2}"#).unwrap();

    recorder.record(&json!({"response": "no counters"})).await.unwrap();

    assert_eq!(read_file(&recorder), json!({"prompt_eval_count": 4, "eval_count": 2}));
}

#[tokio::test]
async fn test_totals() {
    let dir = TempDir::new().unwrap();
    let recorder = recorder_in(&dir);

    assert_eq!(recorder.totals().await, UsageTotals::default());

    recorder.record(&json!({"prompt_eval_count": 8, "eval_count": 9})).await;
    let totals = recorder.totals().await;
    assert_eq!(totals.prompt_eval_count, 8);
    assert_eq!(totals.eval_count, 9);

    std::fs::write(recorder.path(), "garbage").unwrap();
    assert_eq!(recorder.totals().await, UsageTotals::default());
}

#[tokio::test]
async fn test_record_failure_is_swallowed() {
    let dir = TempDir::new().unwrap();
    // a directory where the file should be makes both read and write fail
    let path = dir.path().join(".llm_usage_stats.json");
    std::fs::create_dir(&path).unwrap();
    let recorder = UsageRecorder::new(path);

    let result = recorder.record(&json!({"prompt_eval_count": 1, "eval_count": 1})).await;
    assert!(result.is_none());
}
