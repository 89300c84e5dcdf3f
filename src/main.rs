//! Binary entry point for the hoist CLI.
//!
//! Every command prints JSON on stdout unless a plain-text format is asked
//! for. Failures print an error response and exit with its error code.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use hoist::cli::{run_apply, run_prepare, run_tweaks};
use hoist_core::config::{CliOverrides, LanguageStandard, ResolvedConfig};
use hoist_core::error::{HoistError, OutputErrorCode};
use hoist_core::output::{emit_response, ErrorResponse};
use hoist_core::types::SelectionArg;
use hoist_cxx::ops::extract_variable::EXTRACT_VARIABLE_ID;

/// Extract a selected C/C++/Objective-C subexpression into a variable.
#[derive(Parser, Debug)]
#[command(name = "hoist", version, about = "Extract subexpressions to variables")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (`RUST_LOG` takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit log records as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the apply command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ApplyFormat {
    /// Full JSON response with edits and summary (default).
    #[default]
    Json,
    /// Unified diff of the main file.
    Diff,
    /// The rewritten main file.
    Text,
}

/// Snapshot and selection shared by `prepare` and `apply`.
#[derive(Args, Debug)]
struct Target {
    /// AST snapshot (JSON) exported for the translation unit.
    #[arg(long)]
    snapshot: PathBuf,

    /// Selection as half-open byte offsets: `start..end`.
    #[arg(long, conflicts_with = "at", required_unless_present = "at")]
    range: Option<SelectionArg>,

    /// Selection as 1-indexed positions: `line:col-line:col` or `line:col`.
    #[arg(long)]
    at: Option<SelectionArg>,

    /// Tweak to run.
    #[arg(long, default_value = EXTRACT_VARIABLE_ID)]
    tweak: String,

    /// Language standard override (c, objc, c++98, c++11, ...).
    #[arg(long = "std")]
    standard: Option<LanguageStandard>,
}

impl Target {
    fn selection(&self) -> Result<SelectionArg, HoistError> {
        self.range
            .or(self.at)
            .ok_or_else(|| HoistError::invalid_args("one of --range or --at is required"))
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List the available tweaks.
    Tweaks,
    /// Report whether a tweak is available for a selection.
    Prepare {
        #[command(flatten)]
        target: Target,
    },
    /// Apply a tweak and print its edits.
    Apply {
        #[command(flatten)]
        target: Target,

        /// Name for the extracted variable.
        #[arg(long)]
        name: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ApplyFormat::default())]
        format: ApplyFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), HoistError> {
    match cli.command {
        Command::Tweaks => emit(&run_tweaks()),
        Command::Prepare { target } => {
            let config = resolve_config(&target, None);
            let response = run_prepare(&target.snapshot, target.selection()?, &target.tweak, &config)?;
            emit(&response)
        }
        Command::Apply {
            target,
            name,
            format,
        } => {
            let config = resolve_config(&target, name);
            let outcome = run_apply(&target.snapshot, target.selection()?, &target.tweak, &config)?;
            match format {
                ApplyFormat::Json => emit(&outcome.response),
                ApplyFormat::Diff => print_raw(&outcome.response.patch.unified_diff),
                ApplyFormat::Text => print_raw(&outcome.rewritten),
            }
        }
    }
}

fn resolve_config(target: &Target, name: Option<String>) -> ResolvedConfig {
    ResolvedConfig::resolve(&CliOverrides {
        variable_name: name,
        standard: target.standard,
    })
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), HoistError> {
    emit_response(response, &mut io::stdout()).map_err(|e| HoistError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn print_raw(text: &str) -> Result<(), HoistError> {
    let mut stdout = io::stdout();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| HoistError::internal(e.to_string()))
}
