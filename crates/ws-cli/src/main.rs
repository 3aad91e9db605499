use std::fs;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ws_core::{EngineOutput, FeedbackLog, WandScriptError};
use ws_parser::{highlight, parse_program};
use ws_runtime::{
    CommandHandler, CommandOutcome, CommandRegistry, WandScriptEngine, WandScriptEngineOptions,
    DEFAULT_MAX_WHILE_ITERATIONS, DEFAULT_PACING_DELAY_MS,
};

const POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Parser)]
#[command(name = "wandscript")]
#[command(about = "WandScript interpreter CLI")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    Run(RunArgs),
    Parse(ParseArgs),
    Highlight(HighlightArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    script: String,
    #[arg(long = "delay-ms", default_value_t = DEFAULT_PACING_DELAY_MS)]
    delay_ms: u64,
    #[arg(long = "max-while-iterations", default_value_t = DEFAULT_MAX_WHILE_ITERATIONS)]
    max_while_iterations: u32,
}

#[derive(Debug, Args)]
struct ParseArgs {
    script: String,
}

#[derive(Debug, Args)]
struct HighlightArgs {
    script: String,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, WandScriptError> {
    match cli.command {
        Mode::Run(args) => run_script(args),
        Mode::Parse(args) => run_parse(args),
        Mode::Highlight(args) => run_highlight(args),
    }
}

fn run_script(args: RunArgs) -> Result<i32, WandScriptError> {
    let source = read_source(&args.script)?;
    let mut engine = WandScriptEngine::new(WandScriptEngineOptions {
        commands: builtin_commands(),
        pacing_delay_ms: args.delay_ms,
        max_while_iterations: args.max_while_iterations,
        ..Default::default()
    });
    engine.start(&source)?;

    loop {
        match engine.step()? {
            EngineOutput::Paced => {
                thread::sleep(Duration::from_millis(engine.pacing_delay_ms()));
            }
            EngineOutput::Waiting => {
                thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
            }
            EngineOutput::Finished { message } => {
                println!("{}", message);
                return Ok(0);
            }
        }
    }
}

fn run_parse(args: ParseArgs) -> Result<i32, WandScriptError> {
    let source = read_source(&args.script)?;
    let mut feedback = FeedbackLog::new();
    let statements = parse_program(&source, &mut feedback);
    let report = serde_json::json!({
        "statements": statements,
        "diagnostics": feedback.messages(),
    });
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|error| WandScriptError::new("CLI_PARSE_RENDER", error.to_string()))?;
    println!("{}", rendered);
    Ok(if feedback.is_empty() { 0 } else { 1 })
}

fn run_highlight(args: HighlightArgs) -> Result<i32, WandScriptError> {
    let source = read_source(&args.script)?;
    println!("{}", highlight(&source));
    Ok(0)
}

fn read_source(path: &str) -> Result<String, WandScriptError> {
    fs::read_to_string(path)
        .map_err(|error| WandScriptError::new("CLI_SOURCE_READ", error.to_string()))
}

fn builtin_commands() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register_fn("say", |args: &[String], _feedback: &mut FeedbackLog| {
        println!("{}", args.join(" "));
    });
    registry.register("wait", WaitCommand { polls_remaining: 0 });
    registry
}

/// Suspends the run for the number of seconds given as the first argument.
/// The delay is realized through the engine's poll cadence rather than a
/// blocking sleep, so an abort still lands between polls.
struct WaitCommand {
    polls_remaining: u64,
}

impl CommandHandler for WaitCommand {
    fn begin(&mut self, args: &[String], feedback: &mut FeedbackLog) -> CommandOutcome {
        let seconds: f64 = match args.first().map(|raw| raw.parse()) {
            Some(Ok(seconds)) => seconds,
            _ => {
                feedback.push("wait() expects a number of seconds");
                return CommandOutcome::Done;
            }
        };
        let millis = (seconds * 1000.0).max(0.0) as u64;
        self.polls_remaining = millis / POLL_INTERVAL_MS;
        if self.polls_remaining == 0 {
            CommandOutcome::Done
        } else {
            CommandOutcome::Pending
        }
    }

    fn poll(&mut self, _feedback: &mut FeedbackLog) -> CommandOutcome {
        self.polls_remaining = self.polls_remaining.saturating_sub(1);
        if self.polls_remaining == 0 {
            CommandOutcome::Done
        } else {
            CommandOutcome::Pending
        }
    }

    fn cancel(&mut self) {
        self.polls_remaining = 0;
    }
}

fn emit_error(error: WandScriptError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}
