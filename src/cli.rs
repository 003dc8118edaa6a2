//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::client::DEFAULT_BASE_URL;
use crate::output::Format;
use crate::timefmt::{month_label, parse_month_label};

/// Philippine earthquake monitoring map from a single binary.
#[derive(Parser, Debug)]
#[command(name = "lindol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a month of earthquakes (one-shot fetch and exit)
    Events(EventsArgs),

    /// Start the dashboard server
    Serve(ServeArgs),
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Month to fetch, e.g. "March 2024" (defaults to the current month)
    #[arg(long, value_parser = parse_month)]
    pub month: Option<String>,

    /// Base URL of the seismic feed API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Minimum magnitude to show
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the seismic feed API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse and canonicalize a `Month YYYY` argument.
fn parse_month(s: &str) -> Result<String, String> {
    let (year, month) = parse_month_label(s)
        .ok_or_else(|| format!("invalid month '{s}' (expected e.g. 'March 2024')"))?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(month_label)
        .ok_or_else(|| format!("invalid month '{s}'"))
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_canonicalizes() {
        assert_eq!(parse_month("March 2024").unwrap(), "March 2024");
        assert_eq!(parse_month("march 2024").unwrap(), "March 2024");
        assert!(parse_month("Smarch 2024").is_err());
    }
}
