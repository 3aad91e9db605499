pub mod engine;
pub mod eval;
pub mod gates;
pub mod range;
pub mod registry;

pub use engine::{
    WandScriptEngine, WandScriptEngineOptions, DEFAULT_MAX_WHILE_ITERATIONS,
    DEFAULT_PACING_DELAY_MS, RUN_FINISHED_MESSAGE, RUN_SUCCESS_MESSAGE,
};
pub use eval::{evaluate, evaluate_bool};
pub use gates::{GameGate, OpenAdmission, OpenGameGate, RunAdmission};
pub use range::parse_range;
pub use registry::{CommandHandler, CommandOutcome, CommandRegistry};
