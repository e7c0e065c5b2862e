// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Flags:
//   --config <path>      JSON or YAML config file (default: built-in config)
//   --log <level>        debug | info | warn | error
//   --timeout <duration> overall run timeout, e.g. 30s, 2m, 1h30m (0 = none)
//   --seed <n>           seed the random choices for a reproducible crawl
//   --version            print version and exit
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "urusai",
    version,
    about = "A synthetic HTTP traffic generator",
    long_about = "urusai performs random, bounded-depth web crawls from a set of root URLs, \
                  generating organic-looking HTTP traffic until it is stopped."
)]
pub struct Cli {
    /// Path to a JSON or YAML config file (optional)
    ///
    /// Files ending in .yaml or .yml are read as YAML, anything else as JSON.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log: LogLevel,

    /// Overall run timeout (e.g. 30s, 2m, 1h30m). 0 = no timeout
    ///
    /// Overrides the timeout from the config file.
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Seed for the random number generator (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    // The directive understood by tracing_subscriber::EnvFilter
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// Parses a duration such as "90", "30s", "2m", "1h30m" or "500ms"
//
// A bare number is taken as seconds.
fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("invalid duration '{}': expected a number", input));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|e| format!("invalid duration '{}': {}", input, e))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        total += match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            "" => return Err(format!("invalid duration '{}': missing unit", input)),
            other => return Err(format!("invalid duration '{}': unknown unit '{}'", input, other)),
        };
    }

    Ok(total)
}
