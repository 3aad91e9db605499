use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use ws_core::EngineOutput;
use ws_runtime::{
    CommandHandler, CommandOutcome, CommandRegistry, WandScriptEngine, WandScriptEngineOptions,
};

use crate::source::{read_case_script, read_test_case};
use crate::{ExpectedCommand, TestCase, WsToolError};

const MAX_STEPS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub commands: Vec<ExpectedCommand>,
    pub feedback: Vec<String>,
    pub message: String,
    pub steps: usize,
}

struct RecordingCommand {
    name: String,
    suspend: bool,
    log: Rc<RefCell<Vec<ExpectedCommand>>>,
}

impl CommandHandler for RecordingCommand {
    fn begin(
        &mut self,
        args: &[String],
        _feedback: &mut ws_core::FeedbackLog,
    ) -> CommandOutcome {
        self.log.borrow_mut().push(ExpectedCommand {
            name: self.name.clone(),
            args: args.to_vec(),
        });
        if self.suspend {
            CommandOutcome::Pending
        } else {
            CommandOutcome::Done
        }
    }

    // Suspending commands complete on their first poll.
    fn poll(&mut self, _feedback: &mut ws_core::FeedbackLog) -> CommandOutcome {
        CommandOutcome::Done
    }
}

pub fn run_case(case_path: &Path, case: &TestCase) -> Result<RunReport, WsToolError> {
    let script = read_case_script(case_path, case)?;

    let log: Rc<RefCell<Vec<ExpectedCommand>>> = Rc::new(RefCell::new(Vec::new()));
    let mut registry = CommandRegistry::new();
    for name in &case.commands {
        registry.register(
            name.clone(),
            RecordingCommand {
                name: name.clone(),
                suspend: case.suspending_commands.contains(name),
                log: Rc::clone(&log),
            },
        );
    }

    let mut options = WandScriptEngineOptions {
        commands: registry,
        ..Default::default()
    };
    if let Some(max) = case.max_while_iterations {
        options.max_while_iterations = max;
    }
    let mut engine = WandScriptEngine::new(options);
    engine.start(&script).map_err(WsToolError::Engine)?;

    for step in 1..=MAX_STEPS {
        match engine.step().map_err(WsToolError::Engine)? {
            EngineOutput::Paced | EngineOutput::Waiting => {}
            EngineOutput::Finished { message } => {
                return Ok(RunReport {
                    commands: log.borrow().clone(),
                    feedback: engine.feedback().messages().to_vec(),
                    message,
                    steps: step,
                });
            }
        }
    }

    Err(WsToolError::GuardExceeded {
        max_steps: MAX_STEPS,
    })
}

pub fn assert_case(case_path: &Path) -> Result<(), WsToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(case_path, &case)?;

    if report.commands.len() != case.expected_commands.len() {
        let observed = serde_json::to_string_pretty(&report.commands)
            .map_err(WsToolError::CommandSerialize)?;
        return Err(WsToolError::CommandCountMismatch {
            expected: case.expected_commands.len(),
            actual: report.commands.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_commands
        .iter()
        .zip(report.commands.iter())
        .enumerate()
    {
        if expected != actual {
            let expected =
                serde_json::to_string(expected).map_err(WsToolError::CommandSerialize)?;
            let actual = serde_json::to_string(actual).map_err(WsToolError::CommandSerialize)?;
            return Err(WsToolError::CommandMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    if report.feedback != case.expected_feedback {
        return Err(WsToolError::FeedbackMismatch {
            expected: case.expected_feedback.clone(),
            actual: report.feedback,
        });
    }

    if let Some(expected) = &case.expected_message {
        if &report.message != expected {
            return Err(WsToolError::MessageMismatch {
                expected: expected.clone(),
                actual: report.message,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("ws-tool-runner-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    fn write_case(root: &Path, case_json: &str, script: &str) -> PathBuf {
        let case_path = root.join("run.case.json");
        write_file(&case_path, case_json);
        write_file(&root.join("main.ws"), script);
        case_path
    }

    #[test]
    fn run_case_records_commands_in_call_order() {
        let root = temp_dir("order");
        let case_path = write_case(
            &root,
            r#"{"schemaVersion":"ws-tool-case.v1","commands":["move","cast"]}"#,
            "move(\"north\")\nfor i in range(2):\n    cast(i)\n",
        );

        let case = read_test_case(&case_path).expect("case should parse");
        let report = run_case(&case_path, &case).expect("run should pass");

        let observed: Vec<(String, Vec<String>)> = report
            .commands
            .iter()
            .map(|command| (command.name.clone(), command.args.clone()))
            .collect();
        assert_eq!(
            observed,
            vec![
                ("move".to_string(), vec!["north".to_string()]),
                ("cast".to_string(), vec!["0".to_string()]),
                ("cast".to_string(), vec!["1".to_string()]),
            ]
        );
        assert!(report.feedback.is_empty());
    }

    #[test]
    fn run_case_drives_suspending_commands_to_completion() {
        let root = temp_dir("suspend");
        let case_path = write_case(
            &root,
            r#"{
  "schemaVersion": "ws-tool-case.v1",
  "commands": ["walk", "say"],
  "suspendingCommands": ["walk"]
}"#,
            "walk(\"east\")\nsay(\"arrived\")\n",
        );

        let case = read_test_case(&case_path).expect("case should parse");
        let report = run_case(&case_path, &case).expect("run should pass");
        let names: Vec<&str> = report
            .commands
            .iter()
            .map(|command| command.name.as_str())
            .collect();
        assert_eq!(names, ["walk", "say"]);
    }

    #[test]
    fn assert_case_checks_feedback_and_message() {
        let root = temp_dir("feedback");
        let case_path = write_case(
            &root,
            r#"{
  "schemaVersion": "ws-tool-case.v1",
  "expectedFeedback": ["Division by zero"],
  "expectedMessage": "Division by zero"
}"#,
            "x = 1 / 0\n",
        );

        assert_case(&case_path).expect("case should pass");
    }

    #[test]
    fn assert_case_reports_a_command_mismatch() {
        let root = temp_dir("mismatch");
        let case_path = write_case(
            &root,
            r#"{
  "schemaVersion": "ws-tool-case.v1",
  "commands": ["move"],
  "expectedCommands": [{"name": "move", "args": ["south"]}]
}"#,
            "move(\"north\")\n",
        );

        let error = assert_case(&case_path).expect_err("case should fail");
        assert!(matches!(error, WsToolError::CommandMismatch { index: 0, .. }));
    }

    #[test]
    fn run_case_honors_the_while_iteration_override() {
        let root = temp_dir("while-limit");
        let case_path = write_case(
            &root,
            r#"{"schemaVersion":"ws-tool-case.v1","maxWhileIterations":3}"#,
            "n = 0\nwhile True:\n    n = n + 1\n",
        );

        let case = read_test_case(&case_path).expect("case should parse");
        let report = run_case(&case_path, &case).expect("run should pass");
        assert_eq!(report.feedback.len(), 1);
        assert!(report.feedback[0].contains("3 iterations"));
    }
}
