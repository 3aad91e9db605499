use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct WandScriptError {
    pub code: String,
    pub message: String,
    pub line: Option<usize>,
}

impl WandScriptError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(code: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            line: Some(line),
        }
    }
}
