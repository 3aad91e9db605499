use serde::{Deserialize, Serialize};

/// One parsed statement. Every variant keeps its 1-based source line for
/// diagnostics. A tree is built fresh for each run and never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Statement {
    FunctionCall {
        line: usize,
        name: String,
        args: Vec<String>,
    },
    Assignment {
        line: usize,
        name: String,
        expression: String,
    },
    If {
        line: usize,
        branches: Vec<IfBranch>,
        else_block: Option<Vec<Statement>>,
    },
    While {
        line: usize,
        condition: String,
        body: Vec<Statement>,
    },
    For {
        line: usize,
        iterator: String,
        range: String,
        body: Vec<Statement>,
    },
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Self::FunctionCall { line, .. }
            | Self::Assignment { line, .. }
            | Self::If { line, .. }
            | Self::While { line, .. }
            | Self::For { line, .. } => *line,
        }
    }
}

/// An `if` or `elif` arm: condition expression plus nested block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfBranch {
    pub condition: String,
    pub block: Vec<Statement>,
}

/// What the host observes from one pump of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EngineOutput {
    /// A statement or loop iteration finished; wait the pacing delay, then
    /// step again.
    Paced,
    /// The in-flight command handler has not completed; poll again.
    Waiting,
    /// The run ended. `message` is the rendered feedback log, or the fixed
    /// success/finished text.
    Finished { message: String },
}
