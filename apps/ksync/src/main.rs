//! ksync - counting semaphores and resource regions
//!
//! Thin driver over the manager crate: loads configuration, installs the
//! tracing subscriber, forwards manager events into the log and renders a
//! report for the chosen command.

mod cli;
mod demo;
mod error;
mod logging;
mod stress;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::error::CliError;
use clap::Parser;
use ksync_config::{calculate_workers, Config};
use ksync_events::EventReceiver;
use ksync_manager::Manager;
use serde::Serialize;
use std::process;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Report {
    Demo(demo::DemoReport),
    Stress(stress::StressReport),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Precedence: file (or defaults), then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    logging::init_tracing(
        &config.logging.filter,
        config.logging.json,
        cli.global.debug,
    );
    info!("Starting ksync v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = ksync_events::channel();
    let drain = tokio::spawn(drain_events(event_receiver));

    let manager = Manager::from_config(&config).with_events(event_sender);
    // The manager owns the only sender, so the drain ends once it is dropped
    let result = execute_command(cli.command, manager, &config).await;
    if let Err(e) = drain.await {
        error!("Event drain failed: {}", e);
    }
    let report = result?;

    if cli.global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report {
            Report::Demo(report) => report.print(),
            Report::Stress(report) => report.print(),
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Run the command on a blocking thread; semaphore operations block
async fn execute_command(
    command: Commands,
    manager: Manager,
    config: &Config,
) -> Result<Report, CliError> {
    let stress_config = config.stress.clone();
    let task = tokio::task::spawn_blocking(move || match command {
        Commands::Demo { sleep_ms } => {
            demo::run(manager, Duration::from_millis(sleep_ms))
                .map(Report::Demo)
                .map_err(CliError::from)
        }
        Commands::Stress { initial_count, .. } => stress::run(
            &manager,
            calculate_workers(stress_config.workers),
            stress_config.iterations,
            initial_count,
        )
        .map(Report::Stress),
    });

    task.await
        .map_err(|e| CliError::Worker(e.to_string()))?
}

async fn drain_events(mut receiver: EventReceiver) {
    while let Some(message) = receiver.recv().await {
        logging::log_event_with_tracing(&message);
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs, command: &Commands) {
    if global.json {
        config.logging.json = true;
    }

    if let Commands::Stress {
        workers,
        iterations,
        ..
    } = command
    {
        if let Some(workers) = workers {
            config.stress.workers = *workers;
        }
        if let Some(iterations) = iterations {
            config.stress.iterations = *iterations;
        }
    }
}
