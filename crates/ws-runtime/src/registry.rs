use std::collections::BTreeMap;
use std::fmt;

use ws_core::FeedbackLog;

/// What a command handler reports back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The effect is finished; the engine proceeds to the next statement.
    Done,
    /// The effect is still in flight; the engine suspends the run and polls
    /// this handler again on the next pump.
    Pending,
}

/// An external effect invoked by a function-call statement. Handlers get
/// the evaluated, string-converted argument list and the shared feedback
/// log; they police their own preconditions and report failures through the
/// log rather than returning errors.
pub trait CommandHandler {
    fn begin(&mut self, args: &[String], feedback: &mut FeedbackLog) -> CommandOutcome;

    /// Re-checked while the engine is suspended on this handler.
    fn poll(&mut self, _feedback: &mut FeedbackLog) -> CommandOutcome {
        CommandOutcome::Done
    }

    /// Invoked when a hard abort discards the in-flight suspension.
    fn cancel(&mut self) {}
}

struct FnCommand<F>
where
    F: FnMut(&[String], &mut FeedbackLog),
{
    action: F,
}

impl<F> CommandHandler for FnCommand<F>
where
    F: FnMut(&[String], &mut FeedbackLog),
{
    fn begin(&mut self, args: &[String], feedback: &mut FeedbackLog) -> CommandOutcome {
        (self.action)(args, feedback);
        CommandOutcome::Done
    }
}

/// Case-sensitive name-to-handler table. Registering an existing name
/// overwrites the previous handler.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Convenience registration for commands that complete immediately.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: FnMut(&[String], &mut FeedbackLog) + 'static,
    {
        self.register(name, FnCommand { action });
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn begin(
        &mut self,
        name: &str,
        args: &[String],
        feedback: &mut FeedbackLog,
    ) -> Option<CommandOutcome> {
        self.handlers
            .get_mut(name)
            .map(|handler| handler.begin(args, feedback))
    }

    pub fn poll(&mut self, name: &str, feedback: &mut FeedbackLog) -> Option<CommandOutcome> {
        self.handlers
            .get_mut(name)
            .map(|handler| handler.poll(feedback))
    }

    pub fn cancel(&mut self, name: &str) {
        if let Some(handler) = self.handlers.get_mut(name) {
            handler.cancel();
        }
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandRegistry")
            .field("names", &self.names())
            .finish()
    }
}
