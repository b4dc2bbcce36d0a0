//! plantwatch - send light and watering commands to a plant monitor device.
//!
//! Configuration comes from the environment or a `.env` file in the working
//! directory (`THINGSBOARD_URL`, `THINGSBOARD_USERNAME`,
//! `THINGSBOARD_PASSWORD`, `THINGSBOARD_DEVICE_ID`).

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use plantwatch_core::{ControlIntent, DeviceRelay, RelayConfig};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name used when `PLANTWATCH_LOG_DIR` is set
const LOG_FILE_PREFIX: &str = "plantwatch.log";

const USAGE: &str = "\
Usage: plantwatch <command> [--device <id>]

Commands:
  light on     Switch the grow light on
  light off    Switch the grow light off
  water        Trigger the water pump
  login        Check the configured ThingsBoard credentials
  help         Show this message

Options:
  --device <id>  Target device (defaults to THINGSBOARD_DEVICE_ID)
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Control {
        intent: ControlIntent,
        device: Option<String>,
    },
    Login,
    Help,
}

/// Parse arguments (without the program name)
fn parse_args(args: &[String]) -> Result<Command> {
    let mut device = None;
    let mut words = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--device" | "-d" => {
                let value = iter.next().context("--device requires a value")?;
                device = Some(value.clone());
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with('-') => bail!("unknown option '{}'", other),
            other => words.push(other),
        }
    }

    match words.as_slice() {
        [] | ["help"] => Ok(Command::Help),
        ["login"] => Ok(Command::Login),
        _ => {
            let intent: ControlIntent = words.join(" ").parse()?;
            Ok(Command::Control { intent, device })
        }
    }
}

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("PLANTWATCH_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn run(command: Command) -> Result<()> {
    let config = RelayConfig::from_env().context("Invalid ThingsBoard configuration")?;
    let relay = DeviceRelay::new(config)?;

    match command {
        Command::Help => print!("{}", USAGE),
        Command::Login => {
            relay.authenticate().await.context("Login failed")?;
            println!("Authenticated with {}", relay.config().base_url);
        }
        Command::Control { intent, device } => {
            let result = relay
                .apply(device.as_deref(), intent)
                .await
                .with_context(|| format!("Failed to send '{}'", intent))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    info!(?command, "plantwatch starting");
    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
