//! File-level tests for appending and resilient loading.

use archgate_jsonl::{append_jsonl, read_jsonl_resilient, Warning};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Event {
    sequence_id: u64,
    action: String,
}

fn event(sequence_id: u64, action: &str) -> Event {
    Event {
        sequence_id,
        action: action.to_string(),
    }
}

#[tokio::test]
async fn append_extends_existing_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");

    append_jsonl(&path, &[event(1, "created")]).await.unwrap();
    append_jsonl(&path, &[event(2, "submitted"), event(3, "approved")])
        .await
        .unwrap();

    let (records, _) = read_jsonl_resilient::<Event, _>(&path).await.unwrap();
    let ids: Vec<u64> = records.iter().map(|e| e.sequence_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let (records, warnings) = read_jsonl_resilient::<Event, _>(dir.path().join("absent.jsonl"))
        .await
        .unwrap();
    assert!(records.is_empty());
    assert!(warnings.is_empty());
}

#[rstest]
#[case::garbage("not json at all")]
#[case::truncated("{\"sequence_id\": 2, \"action\"")]
#[case::wrong_shape("{\"id\": 2}")]
#[tokio::test]
async fn malformed_line_is_skipped_with_warning(#[case] bad_line: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let content = format!(
        "{}\n{bad_line}\n{}\n",
        serde_json::to_string(&event(1, "created")).unwrap(),
        serde_json::to_string(&event(3, "approved")).unwrap(),
    );
    tokio::fs::write(&path, content).await.unwrap();

    let (records, warnings) = read_jsonl_resilient::<Event, _>(&path).await.unwrap();

    assert_eq!(records, vec![event(1, "created"), event(3, "approved")]);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], Warning::MalformedJson { line_number: 2, .. }));
}
