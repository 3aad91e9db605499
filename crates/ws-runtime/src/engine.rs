use std::sync::Arc;

use ws_core::{EngineOutput, Environment, FeedbackLog, Statement, WandScriptError, WsValue};
use ws_parser::parse_program;

use crate::eval::{evaluate, evaluate_bool};
use crate::gates::{GameGate, OpenAdmission, OpenGameGate, RunAdmission};
use crate::range::parse_range;
use crate::registry::{CommandOutcome, CommandRegistry};

pub const DEFAULT_PACING_DELAY_MS: u64 = 300;
pub const DEFAULT_MAX_WHILE_ITERATIONS: u32 = 1000;

/// Shown when a run completes with an empty feedback log.
pub const RUN_SUCCESS_MESSAGE: &str = "Program completed.";
/// Shown after a hard abort replaces the run's output.
pub const RUN_FINISHED_MESSAGE: &str = "Run finished.";

const STEP_GUARD: usize = 10_000;

pub struct WandScriptEngineOptions {
    pub commands: CommandRegistry,
    pub game_gate: Arc<dyn GameGate>,
    pub admission: Arc<dyn RunAdmission>,
    pub pacing_delay_ms: u64,
    pub max_while_iterations: u32,
}

impl Default for WandScriptEngineOptions {
    fn default() -> Self {
        Self {
            commands: CommandRegistry::new(),
            game_gate: Arc::new(OpenGameGate),
            admission: Arc::new(OpenAdmission),
            pacing_delay_ms: DEFAULT_PACING_DELAY_MS,
            max_while_iterations: DEFAULT_MAX_WHILE_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone)]
enum FrameKind {
    /// Plain statement block: an `if` arm or the program root.
    Block,
    /// A `while` body; the condition is re-checked when the body drains.
    WhileBody {
        condition: String,
        line: usize,
        iterations: u32,
    },
    /// A `for` body over a materialized range; `next` indexes the value
    /// bound at the start of the following iteration.
    ForBody {
        iterator: String,
        values: Vec<i64>,
        next: usize,
    },
}

#[derive(Debug, Clone)]
struct Frame {
    statements: Vec<Statement>,
    index: usize,
    kind: FrameKind,
}

enum FrameExit {
    Pop,
    WhileBoundary {
        condition: String,
        line: usize,
        iterations: u32,
    },
    ForNext { iterator: String, value: i64 },
    ForDone { iterator: String },
}

/// Pull-driven interpreter: the host pumps `step()` and reacts to each
/// [`EngineOutput`]. Exactly one run is active at a time; a step executes
/// one simple statement (plus any control headers on the way) and then
/// yields, which is where the host applies the pacing delay.
pub struct WandScriptEngine {
    commands: CommandRegistry,
    game_gate: Arc<dyn GameGate>,
    admission: Arc<dyn RunAdmission>,
    pacing_delay_ms: u64,
    max_while_iterations: u32,

    env: Environment,
    feedback: FeedbackLog,
    frames: Vec<Frame>,
    pending_command: Option<String>,
    running: bool,
    current_line: usize,
}

impl WandScriptEngine {
    pub fn new(options: WandScriptEngineOptions) -> Self {
        Self {
            commands: options.commands,
            game_gate: options.game_gate,
            admission: options.admission,
            pacing_delay_ms: options.pacing_delay_ms,
            max_while_iterations: options.max_while_iterations,
            env: Environment::new(),
            feedback: FeedbackLog::new(),
            frames: Vec::new(),
            pending_command: None,
            running: false,
            current_line: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn pacing_delay_ms(&self) -> u64 {
        self.pacing_delay_ms
    }

    pub fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    /// Begin a run: admission-checked, then the whole tree is parsed before
    /// any statement executes. Syntax diagnostics land in the feedback log
    /// and the run still proceeds past them.
    pub fn start(&mut self, source: &str) -> Result<(), WandScriptError> {
        if self.running {
            return Err(WandScriptError::new(
                "ENGINE_ALREADY_RUNNING",
                "A run is already active.",
            ));
        }
        if self.game_gate.is_game_over() {
            return Err(WandScriptError::new(
                "ENGINE_RUN_REFUSED",
                "The game is over; no new run may start.",
            ));
        }
        if !self.admission.try_register_run() {
            return Err(WandScriptError::new(
                "ENGINE_RUN_REFUSED",
                "Run admission was declined.",
            ));
        }

        self.env.clear();
        self.feedback.clear();
        self.frames.clear();
        self.pending_command = None;
        self.current_line = 0;

        let statements = parse_program(source, &mut self.feedback);
        self.frames.push(Frame {
            statements,
            index: 0,
            kind: FrameKind::Block,
        });
        self.running = true;
        Ok(())
    }

    /// Execute one unit of work. `Paced` asks the host to wait the pacing
    /// delay; `Waiting` asks it to poll the suspended command again;
    /// `Finished` ends the run.
    pub fn step(&mut self) -> Result<EngineOutput, WandScriptError> {
        if !self.running {
            return Err(WandScriptError::new(
                "ENGINE_NOT_RUNNING",
                "No run is active.",
            ));
        }

        if self.game_gate.is_game_over() {
            return Ok(self.finish_aborted());
        }

        if let Some(name) = self.pending_command.clone() {
            return Ok(match self.commands.poll(&name, &mut self.feedback) {
                Some(CommandOutcome::Pending) => EngineOutput::Waiting,
                _ => {
                    self.pending_command = None;
                    EngineOutput::Paced
                }
            });
        }

        let mut guard = 0usize;
        while guard < STEP_GUARD {
            guard += 1;

            let Some(top) = self.frames.last() else {
                return Ok(self.finish_completed());
            };

            if top.index >= top.statements.len() {
                if let Some(output) = self.finish_top_frame() {
                    return Ok(output);
                }
                continue;
            }

            let statement = top.statements[top.index].clone();
            self.frames
                .last_mut()
                .expect("frame checked above")
                .index += 1;
            self.current_line = statement.line();

            match statement {
                Statement::Assignment {
                    name, expression, ..
                } => {
                    let value = evaluate(&expression, &self.env, &mut self.feedback);
                    self.env.bind(name, value);
                    return Ok(EngineOutput::Paced);
                }
                Statement::FunctionCall { line, name, args } => {
                    let evaluated: Vec<String> = args
                        .iter()
                        .map(|arg| evaluate(arg, &self.env, &mut self.feedback).display_text())
                        .collect();
                    return Ok(
                        match self.commands.begin(&name, &evaluated, &mut self.feedback) {
                            None => {
                                self.feedback
                                    .push_line(line, format!("unknown function \"{}\"", name));
                                EngineOutput::Paced
                            }
                            Some(CommandOutcome::Done) => EngineOutput::Paced,
                            Some(CommandOutcome::Pending) => {
                                self.pending_command = Some(name);
                                EngineOutput::Waiting
                            }
                        },
                    );
                }
                Statement::If {
                    branches,
                    else_block,
                    ..
                } => {
                    let mut chosen = None;
                    for branch in branches {
                        if evaluate_bool(&branch.condition, &self.env, &mut self.feedback) {
                            chosen = Some(branch.block);
                            break;
                        }
                    }
                    if let Some(block) = chosen.or(else_block) {
                        self.frames.push(Frame {
                            statements: block,
                            index: 0,
                            kind: FrameKind::Block,
                        });
                    }
                }
                Statement::While {
                    line,
                    condition,
                    body,
                } => {
                    if evaluate_bool(&condition, &self.env, &mut self.feedback) {
                        self.frames.push(Frame {
                            statements: body,
                            index: 0,
                            kind: FrameKind::WhileBody {
                                condition,
                                line,
                                iterations: 0,
                            },
                        });
                    }
                }
                Statement::For {
                    iterator,
                    range,
                    body,
                    ..
                } => {
                    let values = parse_range(&range, &self.env, &mut self.feedback);
                    if values.is_empty() {
                        continue;
                    }
                    self.env.bind(iterator.clone(), WsValue::Int(values[0]));
                    self.frames.push(Frame {
                        statements: body,
                        index: 0,
                        kind: FrameKind::ForBody {
                            iterator,
                            values,
                            next: 1,
                        },
                    });
                }
            }
        }

        Err(WandScriptError::new(
            "ENGINE_GUARD_EXCEEDED",
            format!("Execution guard exceeded {} iterations.", STEP_GUARD),
        ))
    }

    /// Hard cancellation, safe at any moment: the pending handler is
    /// cancelled, environment and feedback are wiped, and the run's output
    /// becomes the fixed finished message.
    pub fn abort(&mut self) -> EngineOutput {
        if let Some(name) = self.pending_command.take() {
            self.commands.cancel(&name);
        }
        if self.running {
            self.admission.run_completed();
        }
        self.frames.clear();
        self.env.clear();
        self.feedback.clear();
        self.running = false;
        self.current_line = 0;
        EngineOutput::Finished {
            message: RUN_FINISHED_MESSAGE.to_string(),
        }
    }

    /// A block at the top of the frame stack drained. Returns an output
    /// when the step should yield (a new loop iteration), `None` when the
    /// walk should continue with the enclosing frame.
    fn finish_top_frame(&mut self) -> Option<EngineOutput> {
        let exit = match &self.frames.last().expect("caller ensured a frame").kind {
            FrameKind::Block => FrameExit::Pop,
            FrameKind::WhileBody {
                condition,
                line,
                iterations,
            } => FrameExit::WhileBoundary {
                condition: condition.clone(),
                line: *line,
                iterations: *iterations,
            },
            FrameKind::ForBody {
                iterator,
                values,
                next,
            } => {
                if *next < values.len() {
                    FrameExit::ForNext {
                        iterator: iterator.clone(),
                        value: values[*next],
                    }
                } else {
                    FrameExit::ForDone {
                        iterator: iterator.clone(),
                    }
                }
            }
        };

        match exit {
            FrameExit::Pop => {
                self.frames.pop();
                None
            }
            FrameExit::WhileBoundary {
                condition,
                line,
                iterations,
            } => {
                // A loop whose condition goes false at the cap exits
                // normally; the limit only fires when another iteration
                // would actually run.
                if !evaluate_bool(&condition, &self.env, &mut self.feedback) {
                    self.frames.pop();
                    return None;
                }
                if iterations + 1 >= self.max_while_iterations {
                    self.frames.pop();
                    self.feedback.push_line(
                        line,
                        format!(
                            "while loop exceeded {} iterations",
                            self.max_while_iterations
                        ),
                    );
                    None
                } else {
                    let top = self.frames.last_mut().expect("frame still present");
                    top.index = 0;
                    if let FrameKind::WhileBody { iterations, .. } = &mut top.kind {
                        *iterations += 1;
                    }
                    Some(EngineOutput::Paced)
                }
            }
            FrameExit::ForNext { iterator, value } => {
                self.env.bind(iterator, WsValue::Int(value));
                let top = self.frames.last_mut().expect("frame still present");
                top.index = 0;
                if let FrameKind::ForBody { next, .. } = &mut top.kind {
                    *next += 1;
                }
                Some(EngineOutput::Paced)
            }
            FrameExit::ForDone { iterator } => {
                self.frames.pop();
                self.env.unbind(&iterator);
                None
            }
        }
    }

    fn finish_completed(&mut self) -> EngineOutput {
        self.running = false;
        self.admission.run_completed();
        let message = if self.feedback.is_empty() {
            RUN_SUCCESS_MESSAGE.to_string()
        } else {
            self.feedback.render()
        };
        EngineOutput::Finished { message }
    }

    fn finish_aborted(&mut self) -> EngineOutput {
        if let Some(name) = self.pending_command.take() {
            self.commands.cancel(&name);
        }
        self.frames.clear();
        self.running = false;
        self.admission.run_completed();
        let message = if self.feedback.is_empty() {
            RUN_FINISHED_MESSAGE.to_string()
        } else {
            self.feedback.render()
        };
        EngineOutput::Finished { message }
    }
}
