//! Pollbar CLI - Download Progress Poller
//!
//! Polls a server's progress endpoint and renders it as a terminal progress bar.

use clap::Parser;
use console::style;
use pollbar::config::{CliArgs, PollerConfig};
use pollbar::error::{PollerError, Result};
use pollbar::poller::{ProgressPoller, SessionEnd, SessionOutcome};
use pollbar::progress::{ProgressDisplay, TerminalDisplay};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(&args);

    // Handle result
    match run(&args) {
        Ok(outcome) if outcome.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(args: &CliArgs) {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &CliArgs) -> Result<SessionOutcome> {
    // Build configuration
    let config = PollerConfig::from_cli(args).map_err(PollerError::Config)?;

    if args.verbose > 0 {
        print_config(&config);
    }

    let display: Arc<dyn ProgressDisplay> = if args.quiet {
        Arc::new(TerminalDisplay::disabled())
    } else {
        Arc::new(TerminalDisplay::new())
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| PollerError::config(format!("Failed to create runtime: {}", e)))?;

    let outcome = rt.block_on(async {
        let poller = ProgressPoller::from_config(config, display)?;
        let wait = poller.trigger()?.wait();
        tokio::pin!(wait);

        let outcome = tokio::select! {
            outcome = &mut wait => outcome,
            _ = tokio::signal::ctrl_c() => {
                poller.cancel_active();
                wait.await
            }
        };
        Ok::<_, PollerError>(outcome)
    })?;

    if !args.quiet {
        print_outcome(&outcome);
    }

    Ok(outcome)
}

fn print_outcome(outcome: &SessionOutcome) {
    match &outcome.end {
        SessionEnd::Completed { progress } => {
            eprintln!(
                "{} Download complete ({:.1}%) after {} polls in {:.1?}",
                style("✓").green().bold(),
                progress.min(100.0),
                outcome.polls,
                outcome.elapsed
            );
        }
        SessionEnd::Failed(e) | SessionEnd::TimedOut(e) => {
            eprintln!("{} {}", style("✗").red().bold(), e);
        }
        SessionEnd::Cancelled | SessionEnd::Superseded => {
            eprintln!("{} Cancelled after {} polls", style("✗").yellow().bold(), outcome.polls);
        }
    }
}

fn print_config(config: &PollerConfig) {
    eprintln!("=== Configuration ===");
    eprintln!("Endpoint:    {}", config.endpoint());
    eprintln!("Interval:    {}", humantime::format_duration(config.interval()));
    eprintln!("Hide delay:  {}", humantime::format_duration(config.hide_delay()));
    eprintln!("Max polls:   {}", config.max_polls.map_or("unlimited".to_string(), |n| n.to_string()));
    eprintln!(
        "Deadline:    {}",
        config
            .deadline()
            .map_or("none".to_string(), |d| humantime::format_duration(d).to_string())
    );
    eprintln!("Width mode:  {:?}", config.width_mode);
    eprintln!();
}
