//! Purpose: `sumweb` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits results on stdout.
//! Invariants: Errors are emitted on stderr (JSON when stderr is not a terminal).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};

use clap::{Args, Parser, Subcommand, error::ErrorKind as ClapErrorKind};
use serde_json::{Value, json};

mod command_dispatch;
mod serve;

use serve::{DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES};
use sumweb::api::{Error, ErrorEnvelope, ErrorKind, to_exit_code};

const DEFAULT_URL: &str = "http://127.0.0.1:8080/sum";
const DEFAULT_DEMO_PORT: u16 = 8080;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `sumweb --help` for usage."));
            }
        },
    };

    serve::init_tracing();
    command_dispatch::dispatch_command(cli.command)
}

#[derive(Parser)]
#[command(
    name = "sumweb",
    version,
    about = "Sum integer or real arrays over a JSON/HTTP endpoint",
    long_about = None,
    after_help = r#"EXAMPLES
  $ sumweb serve --bind 127.0.0.1:8080
  $ sumweb run --url http://127.0.0.1:8080/sum
  $ sumweb sum 1 2 3.5
  $ sumweb demo              # server + client in one process"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Serve POST /sum",
        after_help = r#"NOTES
  - Body: {"input": [numbers]}; reply: {"sum": number}
  - Whole-number arrays are summed as integers, anything else as reals
  - Logging follows RUST_LOG (default: info)"#
    )]
    Serve(ServeArgs),
    #[command(about = "Run the demo requests against a running server")]
    Run {
        #[arg(long, default_value = DEFAULT_URL, help = "Sum endpoint or server URL")]
        url: String,
    },
    #[command(about = "Send one array to a running server and print the reply")]
    Sum {
        #[arg(long, default_value = DEFAULT_URL, help = "Sum endpoint or server URL")]
        url: String,
        #[arg(
            value_name = "NUMBER",
            allow_negative_numbers = true,
            help = "Numbers to sum, written as JSON numerals (3, -0, 2.5, 1e3; not 1. or .5)"
        )]
        numbers: Vec<String>,
    },
    #[command(about = "Start a server in-process and run the demo requests against it")]
    Demo {
        #[arg(long, default_value_t = DEFAULT_DEMO_PORT, help = "Loopback port (0 picks a free one)")]
        port: u16,
    },
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value = DEFAULT_BIND, help = "Bind address")]
    bind: String,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_BODY_BYTES,
        help = "Max request body size in bytes"
    )]
    max_body_bytes: u64,
    #[arg(long, help = "Allow non-loopback binds")]
    allow_non_loopback: bool,
    #[arg(
        long,
        default_value_t = 0,
        help = "Decimal places kept in sums (0 rounds to whole units)"
    )]
    decimals: u32,
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {}", error_message(err));
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        for cause in error_causes(err) {
            eprintln!("caused by: {cause}");
        }
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::MalformedPayload => "malformed payload".to_string(),
        ErrorKind::Transport => "transport failure".to_string(),
        ErrorKind::Encoding => "encoding failure".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut envelope = ErrorEnvelope::from_error(err);
    envelope.error.message = error_message(err);
    let mut value = serde_json::to_value(&envelope).unwrap_or_else(|_| json!({ "error": {} }));
    let causes = error_causes(err);
    if !causes.is_empty() {
        value["error"]["causes"] = json!(causes);
    }
    value
}
