use std::collections::BTreeMap;

use crate::value::WsValue;

/// Flat variable store for one run. The language has a single scope: the
/// environment is created at run start, mutated by assignments and loop
/// iterator bindings, and discarded at run end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: BTreeMap<String, WsValue>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: WsValue) {
        self.bindings.insert(name.into(), value);
    }

    pub fn unbind(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&WsValue> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Append-only diagnostic log for one run, rendered as the run's visible
/// output. There is no separate error channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackLog {
    messages: Vec<String>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn push_line(&mut self, line: usize, message: impl Into<String>) {
        self.messages.push(format!("Line {}: {}", line, message.into()));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn render(&self) -> String {
        self.messages.join("\n")
    }
}
