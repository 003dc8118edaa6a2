//! lindol - Philippine earthquake monitoring map from a single binary.
//!
//! Fetches PHIVOLCS-sourced earthquake data per month and presents it as a
//! terminal dump or as an embedded web dashboard (map, month picker,
//! activity list).

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::error;

mod cache;
mod cli;
mod client;
mod errors;
mod fetcher;
mod listview;
mod map;
mod models;
mod monthpicker;
mod output;
mod server;
mod timefmt;

use cli::{Cli, Command};
use client::{SeismicClient, SeismicSource};
use errors::LindolError;
use models::SeismicEvent;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Events(args) => cmd_events(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `events` command - one-shot fetch of a month's earthquakes.
fn cmd_events(args: cli::EventsArgs) -> Result<()> {
    let client =
        SeismicClient::with_base_url(&args.api_url).context("failed to create seismic client")?;

    let resp = client
        .fetch_month(args.month.as_deref(), None)
        .context("failed to fetch seismic feed")?;

    if let Some(message) = resp.error {
        return Err(LindolError::Feed(message).into());
    }

    let mut events: Vec<SeismicEvent> = resp.all_this_month.unwrap_or_default();

    // The feed orders most recent first; keep that order.
    if let Some(min) = args.min_magnitude {
        events.retain(|e| e.magnitude >= min);
    }
    events.truncate(args.limit);

    let now = Local::now().naive_local();
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format, now)?;

    Ok(())
}

/// Execute the `serve` command - start the dashboard server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        api_url: args.api_url.clone(),
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌏 lindol Dashboard\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", args.api_url);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd")
            .args(["/c", "start", &url])
            .spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
