//! LoadCoord CLI
//!
//! Bootstraps a loading store, runs scenarios against it and tears it down.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use loadcoord::cli::{Cli, Command, OutputFormat, get_log_path};
use loadcoord::config::Config;
use loadcoord::events::{EventLogger, LoadingEvent, read_events};
use loadcoord::overlay::{TerminalIndicator, spawn_overlay};
use loadcoord::scenario::{Scenario, ScenarioRunner};
use loadcoord::store::LoadingStore;

/// How long shutdown waits for background consumers to drain
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let level = match log_level.map(|l| l.to_uppercase()) {
        Some(l) if l == "TRACE" => tracing::Level::TRACE,
        Some(l) if l == "DEBUG" => tracing::Level::DEBUG,
        Some(l) if l == "WARN" => tracing::Level::WARN,
        Some(l) if l == "ERROR" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "LoadCoord loaded config: route-change={}ms, navigation={}ms",
        config.loading.route_change_delay_ms, config.loading.navigation_delay_ms
    );

    match cli.command {
        Some(Command::Run {
            scenario,
            event_log,
            format,
        }) => {
            let scenario = Scenario::load(&scenario).context(format!("Failed to load {}", scenario.display()))?;
            cmd_run(&config, &scenario, event_log, format).await
        }
        Some(Command::Demo { event_log }) => {
            let scenario = Scenario::demo().context("Embedded demo scenario is invalid")?;
            cmd_run(&config, &scenario, event_log, OutputFormat::Text).await
        }
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Events { path, format }) => cmd_events(&path, format),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run one scenario against a freshly bootstrapped store
async fn cmd_run(config: &Config, scenario: &Scenario, event_log: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    // Bootstrap
    let store = LoadingStore::with_event_capacity(config.events.capacity);

    let logger_task: Option<JoinHandle<()>> = match event_log.or_else(|| config.events.log_path.clone()) {
        Some(path) => {
            let logger = EventLogger::open(&path)?;
            info!(path = %path.display(), "Event log enabled");
            Some(tokio::spawn(logger.run(store.subscribe_events())))
        }
        None => None,
    };

    let overlay = if format == OutputFormat::Text {
        println!("{} {}", "▶".cyan(), scenario.name.bold());
        Some(spawn_overlay(store.subscribe(), TerminalIndicator::new()))
    } else {
        None
    };

    let mut runner = ScenarioRunner::new(store.clone(), &config.loading, &scenario.start);
    let result = runner.run(scenario).await;

    // Shutdown: unmount triggers, then force-clear whatever is left
    drop(runner);
    store.dispose();
    drop(store);

    if let Some(overlay) = overlay
        && tokio::time::timeout(DRAIN_TIMEOUT, overlay).await.is_err()
    {
        warn!("Overlay did not stop in time");
    }
    if let Some(logger) = logger_task
        && tokio::time::timeout(DRAIN_TIMEOUT, logger).await.is_err()
    {
        warn!("Event logger did not drain in time");
    }

    let report = result.context(format!("Scenario '{}' failed", scenario.name))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{} {} steps passed, {} route changes",
                "✓".green().bold(),
                report.steps,
                report.route_changes
            );
            for failure in &report.navigation_failures {
                println!("  {} {}", "!".yellow(), failure);
            }
        }
    }

    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn cmd_events(path: &Path, format: OutputFormat) -> Result<()> {
    let entries = read_events(path)?;

    if entries.is_empty() {
        println!("No events found at: {}", path.display());
        return Ok(());
    }

    for entry in &entries {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(entry)?),
            OutputFormat::Text => {
                let stamp = entry.timestamp.format("%H:%M:%S%.3f").to_string();
                let detail = match &entry.event {
                    LoadingEvent::SourceAdded { source, active, .. } => {
                        format!("{} {} (active: {})", "+".green(), source, active)
                    }
                    LoadingEvent::SourceRemoved { source, active, .. } => {
                        format!("{} {} (active: {})", "-".red(), source, active)
                    }
                    LoadingEvent::VisibilityChanged { visible, .. } => {
                        if *visible {
                            "● loading".magenta().to_string()
                        } else {
                            "○ idle".green().to_string()
                        }
                    }
                    LoadingEvent::RegistryCleared { cleared, .. } => {
                        format!("{} cleared {} sources", "×".yellow(), cleared)
                    }
                };
                println!("{} {}", stamp.dimmed(), detail);
            }
        }
    }

    Ok(())
}
