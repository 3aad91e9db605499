use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{TestCase, WsToolError, TESTCASE_SCHEMA_V1};

/// Finds every `*.case.json` under `root`, in path order.
pub fn discover_cases(root: &Path) -> Vec<PathBuf> {
    let mut cases: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.to_string_lossy().ends_with(".case.json"))
        .collect();
    cases.sort();
    cases
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, WsToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| WsToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| WsToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(WsToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

/// The case's script path is relative to the case file itself.
pub fn read_case_script(case_path: &Path, case: &TestCase) -> Result<String, WsToolError> {
    let parent = case_path
        .parent()
        .ok_or_else(|| WsToolError::CaseOrphaned {
            path: case_path.to_path_buf(),
        })?;
    let script_path = parent.join(&case.script);
    fs::read_to_string(&script_path).map_err(|source| WsToolError::ReadFile {
        path: script_path,
        source,
    })
}
