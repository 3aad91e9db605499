use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "ws-tool-case.v1";

/// A scripted run with the exact command calls and feedback it must
/// produce. The script source lives next to the case file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_script")]
    pub script: String,
    /// Command names the runner registers for the script to call.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Subset of `commands` that suspend once before completing.
    #[serde(default)]
    pub suspending_commands: Vec<String>,
    #[serde(default)]
    pub max_while_iterations: Option<u32>,
    #[serde(default)]
    pub expected_commands: Vec<ExpectedCommand>,
    #[serde(default)]
    pub expected_feedback: Vec<String>,
    #[serde(default)]
    pub expected_message: Option<String>,
}

fn default_script() -> String {
    "main.ws".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCommand {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod case_tests {
    use super::*;

    #[test]
    fn default_script_returns_main_ws() {
        assert_eq!(default_script(), "main.ws");
    }

    #[test]
    fn testcase_deserialize_applies_defaults() {
        let parsed: TestCase = serde_json::from_str(
            r#"{
  "schemaVersion": "ws-tool-case.v1"
}"#,
        )
        .expect("testcase should deserialize");

        assert_eq!(parsed.schema_version, TESTCASE_SCHEMA_V1);
        assert_eq!(parsed.script, "main.ws");
        assert!(parsed.commands.is_empty());
        assert!(parsed.suspending_commands.is_empty());
        assert!(parsed.max_while_iterations.is_none());
        assert!(parsed.expected_commands.is_empty());
        assert!(parsed.expected_feedback.is_empty());
        assert!(parsed.expected_message.is_none());
    }

    #[test]
    fn expected_command_deserialize_defaults_args() {
        let parsed: ExpectedCommand =
            serde_json::from_str(r#"{"name":"move"}"#).expect("command should deserialize");
        assert_eq!(parsed.name, "move");
        assert!(parsed.args.is_empty());
    }
}
