mod case;
mod runner;
mod source;

pub use case::{ExpectedCommand, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport};
pub use source::{discover_cases, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("Testcase {path} has no parent directory.")]
    CaseOrphaned { path: PathBuf },
    #[error("Engine error: {0}")]
    Engine(#[from] ws_core::WandScriptError),
    #[error("Guard exceeded: max_steps={max_steps}.")]
    GuardExceeded { max_steps: usize },
    #[error("Expected command count {expected}, actual {actual}. observed={observed}")]
    CommandCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Command mismatch at index {index}. expected={expected} actual={actual}")]
    CommandMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Expected feedback {expected:?}, actual {actual:?}.")]
    FeedbackMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("Expected finish message {expected:?}, actual {actual:?}.")]
    MessageMismatch { expected: String, actual: String },
    #[error("Failed to serialize command for diff: {0}")]
    CommandSerialize(serde_json::Error),
}
