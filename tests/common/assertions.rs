//! Custom test assertions for script host tests

use serde_json::Value;
use std::path::{Path, PathBuf};
use track_dl::{DiagnosticRecord, ErrorInfo, RecordKind};

/// Output payloads in order
pub fn outputs(records: &[DiagnosticRecord]) -> Vec<&Value> {
    records
        .iter()
        .filter_map(|r| match r {
            DiagnosticRecord::Output(value) => Some(value),
            _ => None,
        })
        .collect()
}

/// Error payloads in order
pub fn errors(records: &[DiagnosticRecord]) -> Vec<&ErrorInfo> {
    records
        .iter()
        .filter_map(|r| match r {
            DiagnosticRecord::Error(info) => Some(info),
            _ => None,
        })
        .collect()
}

/// Verbose messages in order
pub fn verbose_messages(records: &[DiagnosticRecord]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|r| match r {
            DiagnosticRecord::Verbose(message) => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

/// Number of records of one kind
pub fn count_kind(records: &[DiagnosticRecord], kind: RecordKind) -> usize {
    records.iter().filter(|r| r.kind() == kind).count()
}

/// Assert the records are bracketed by the Begin!/End! lifecycle markers
pub fn assert_bracketed(records: &[DiagnosticRecord]) {
    assert!(
        matches!(records.first(), Some(DiagnosticRecord::Verbose(m)) if m == "Begin!"),
        "first record should be Begin!, got {:?}",
        records.first()
    );
    assert!(
        matches!(records.last(), Some(DiagnosticRecord::Verbose(m)) if m == "End!"),
        "last record should be End!, got {:?}",
        records.last()
    );
}

/// Assert exactly one Output record holding an absolute path, and return it
pub fn assert_single_saved_path(records: &[DiagnosticRecord]) -> PathBuf {
    let outputs = outputs(records);
    assert_eq!(outputs.len(), 1, "expected one output, got {:?}", outputs);
    assert!(errors(records).is_empty(), "unexpected errors: {:?}", errors(records));

    let path = PathBuf::from(
        outputs[0]
            .as_str()
            .unwrap_or_else(|| panic!("output is not a path string: {}", outputs[0])),
    );
    assert!(path.is_absolute(), "saved path {:?} is not absolute", path);
    path
}

/// Assert a file exists with the expected content
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual =
        std::fs::read(path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e));
    assert_eq!(actual, expected, "content mismatch in {:?}", path);
}
