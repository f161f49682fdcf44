// xmatch CLI - match tracks across the upstream/downstream detector boundary

mod exit_codes;
mod run;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_EVENTS, EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "xmatch")]
#[command(about = "Match reconstructed tracks across a detector boundary")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every event in an event file
    #[command(after_help = "\
Examples:
  xmatch run match.toml events.json
  xmatch run match.toml events.json --json
  xmatch run match.toml events.json --output matches.json
  RUST_LOG=xmatch_matcher=debug xmatch run match.toml events.json")]
    Run {
        /// Path to the matcher config (.toml)
        config: PathBuf,

        /// Path to the event file (JSON array of events)
        events: PathBuf,

        /// Print JSON results to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON results to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a matcher config without running
    #[command(after_help = "\
Examples:
  xmatch validate match.toml")]
    Validate {
        /// Path to the matcher config (.toml)
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format(|buf, record| {
            writeln!(buf, "[{}] {} - {}", record.level(), record.target(), record.args())
        })
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => Err(CliError::usage("no command given")
            .with_hint("run `xmatch --help` for the list of commands")),
        Some(Commands::Run { config, events, json, output }) => {
            run::cmd_run(config, events, json, output)
        }
        Some(Commands::Validate { config }) => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn events(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EVENTS, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
