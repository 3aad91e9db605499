use std::path::PathBuf;

use ws_tool::{assert_case, discover_cases};

fn demos_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

#[test]
fn bundled_demo_cases_pass() {
    let cases = discover_cases(&demos_root());
    assert!(!cases.is_empty(), "no demo cases found");
    for case_path in cases {
        assert_case(&case_path)
            .unwrap_or_else(|error| panic!("{} failed: {}", case_path.display(), error));
    }
}
