//! slotkeeper - keypad slot controller on a console.
//!
//! Keys are read from standard input and the 2×16 panel is printed to
//! standard output after every screen. Logs go to standard error.

mod console;
mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use slotkeeper_controller::{Controller, ControllerConfig};
use slotkeeper_core::constants::IMAGE_SIZE;
use slotkeeper_hardware::{FileEeprom, VirtualKeypad};
use slotkeeper_storage::PersistentImage;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::ConsoleDisplay;

/// Keypad-driven slot controller
#[derive(Parser)]
#[command(name = "slotkeeper")]
#[command(about = "Assign and release PIN-protected slots from a keypad")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the EEPROM image file
    #[arg(long, default_value = "slotkeeper.eeprom")]
    eeprom: PathBuf,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed PIN generator seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. `debug` or `slotkeeper_storage=trace` (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Commands {
    /// Run the controller with keys from stdin (default)
    #[default]
    Run,

    /// Print the stored image as JSON without modifying it
    Dump,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or_default() {
        Commands::Run => run(&cli).await,
        Commands::Dump => dump(&cli),
    };
    exit_code(result)
}

/// Log a fatal error once and map the outcome to the process status.
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let storage = FileEeprom::open(&cli.eeprom, IMAGE_SIZE)
        .with_context(|| format!("failed to open EEPROM image {}", cli.eeprom.display()))?;
    info!("Using EEPROM image {}", cli.eeprom.display());

    let (keypad, handle) = VirtualKeypad::new();
    let mut controller = Controller::boot(keypad, ConsoleDisplay::stdout(), storage, config)?;

    let feeder = tokio::spawn(input::feed_keys(tokio::io::stdin(), handle));
    let outcome = controller.run().await;
    feeder.abort();

    outcome?;
    info!("Session ended");
    Ok(())
}

fn dump(cli: &Cli) -> anyhow::Result<()> {
    let eeprom = FileEeprom::snapshot(&cli.eeprom, IMAGE_SIZE)
        .with_context(|| format!("failed to read EEPROM image {}", cli.eeprom.display()))?;
    let report = PersistentImage::new(eeprom)?.report()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(Ok(())), ExitCode::SUCCESS);
        assert_eq!(
            exit_code(Err(anyhow::anyhow!("storage write failed"))),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["slotkeeper"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.eeprom, PathBuf::from("slotkeeper.eeprom"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_dump_subcommand_with_flags() {
        let cli = Cli::parse_from(["slotkeeper", "--eeprom", "/tmp/x.img", "--seed", "7", "dump"]);
        assert!(matches!(cli.command, Some(Commands::Dump)));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(load_config(&cli).unwrap().seed, Some(7));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = Cli::parse_from(["slotkeeper", "--config", "/nonexistent/slotkeeper.toml"]);
        assert!(load_config(&cli).is_err());
    }
}
