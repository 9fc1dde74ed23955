//! Dropzone launcher
//!
//! Usage:
//!     dropzone --config dropzone.toml run
//!     dropzone --config dropzone.toml once --json
//!     dropzone --config dropzone.toml check

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dropzone::{IntakeConfig, Poller, ShutdownToken};
use dropzone_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dropzone", about = "Validate and extract archives dropped into a watched directory")]
struct Cli {
    /// Path to the TOML configuration
    #[arg(long, env = "DROPZONE_CONFIG", default_value = "dropzone.toml")]
    config: PathBuf,

    /// Debug-level console logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory for daily log files (default: $DROPZONE_HOME/logs)
    #[arg(long, env = "DROPZONE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the upload directory until interrupted
    Run,
    /// Run a single scan and print what happened
    Once {
        /// Print the tick report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration and list the rules
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = IntakeConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command {
        Command::Check => check(&config),
        Command::Once { json } => {
            let _logging = init_logging(LogConfig {
                app_name: "dropzone",
                verbose: cli.verbose,
                log_dir: cli.log_dir,
                console_only: true,
            })?;
            once(&config, json)
        }
        Command::Run => {
            let logging = init_logging(LogConfig {
                app_name: "dropzone",
                verbose: cli.verbose,
                log_dir: cli.log_dir,
                console_only: false,
            })?;
            if let Some(dir) = logging.dir() {
                info!("Logs: {}", dir.display());
            }
            run(&config)
        }
    }
}

fn build_poller(config: &IntakeConfig) -> Result<Poller> {
    let poller = Poller::new(config).context("Invalid configuration")?;
    config
        .ensure_directories()
        .context("Failed to create intake directories")?;
    Ok(poller)
}

fn run(config: &IntakeConfig) -> Result<()> {
    let poller = build_poller(config)?;

    info!("Starting Dropzone");
    info!("  Upload: {}", config.upload_dir.display());
    info!("  Destination: {}", config.destination_base.display());
    info!("  Rejected: {}", config.rejected_dir.display());

    let shutdown = ShutdownToken::new();
    install_signal_handlers(&shutdown)?;

    poller.run(&shutdown);

    info!("Shutdown complete");
    Ok(())
}

fn once(config: &IntakeConfig, json: bool) -> Result<()> {
    let poller = build_poller(config)?;
    let report = poller.run_once();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Scanned:     {}", report.scanned);
        println!("Extracted:   {}", report.extracted);
        println!("Quarantined: {}", report.quarantined);
        println!("Retained:    {}", report.retained);
        println!("Deferred:    {}", report.deferred);
        if report.entry_failures > 0 {
            println!("Entry failures: {}", report.entry_failures);
        }
        if let Some(err) = &report.listing_error {
            println!("Listing error: {}", err);
        }
    }
    Ok(())
}

fn check(config: &IntakeConfig) -> Result<()> {
    let poller = Poller::new(config).context("Invalid configuration")?;

    println!("Upload:        {}", config.upload_dir.display());
    println!("Destination:   {}", config.destination_base.display());
    println!("Rejected:      {}", config.rejected_dir.display());
    println!("Stale after:   {} ms", config.stale_file_wait_ms);
    println!("Poll interval: {} ms", config.poll_interval_ms);
    println!();

    if poller.registry().is_empty() {
        println!("No rules configured: every file will go stale and be rejected.");
        return Ok(());
    }

    println!("{:<4} {:<40} {:>8}  DESTINATION", "#", "PATTERN", "ENTRIES");
    for (i, rule) in poller.registry().rules().enumerate() {
        println!(
            "{:<4} {:<40} {:>8}  {}",
            i + 1,
            rule.pattern(),
            rule.expected_entry_count,
            rule.destination.display()
        );
    }
    Ok(())
}

fn install_signal_handlers(shutdown: &ShutdownToken) -> Result<()> {
    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let token = shutdown.clone();
        std::thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("Received signal {}, shutting down after the current tick...", sig);
                token.request();
            }
        });
    }

    #[cfg(windows)]
    {
        let token = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C, shutting down after the current tick...");
            token.request();
        })?;
    }

    Ok(())
}
