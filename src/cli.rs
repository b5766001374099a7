// src/cli.rs

//! CLI argument parsing using `clap`.

use std::str::FromStr;

use clap::{Parser, ValueEnum};

use crate::types::{Payload, Value};

/// Command-line arguments for `sigdispatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sigdispatch",
    version,
    about = "Launch processes in response to named signals, as declared in a TOML file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the configuration file (TOML).
    #[arg(
        long,
        short = 'p',
        visible_alias = "path",
        value_name = "PATH",
        default_value = "Sigdispatch.toml"
    )]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SIGDISPATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Refuse to start if an event or signal references something unknown.
    #[arg(long)]
    pub strict: bool,

    /// Load and print the signal graph, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Exit once no target is running and no event is pending.
    #[arg(long)]
    pub once: bool,

    /// Launch every registered target (fixed arguments only) after `init`.
    #[arg(long)]
    pub run_all: bool,

    /// Dispatch a signal after `init`: `name` or `name:key=value,key=value`.
    #[arg(long = "signal", value_name = "SPEC")]
    pub signals: Vec<SignalSpec>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// A signal given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSpec {
    pub name: String,
    pub payload: Payload,
}

impl FromStr for SignalSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = match s.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (s.trim(), None),
        };

        if name.is_empty() {
            return Err(format!("invalid signal spec '{s}': empty signal name"));
        }

        let mut payload = Payload::new();
        for pair in rest.into_iter().flat_map(|r| r.split(',')).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(format!(
                    "invalid signal spec '{s}': expected key=value, got '{pair}'"
                ));
            };
            payload.insert(key.trim().to_string(), Value::String(value.to_string()));
        }

        Ok(SignalSpec {
            name: name.to_string(),
            payload,
        })
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
