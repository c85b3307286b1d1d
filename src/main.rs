//! ppg-recorder - Main Entry Point
//!
//! Records integer samples from a serial sensor into a CSV file for a fixed
//! window.
//!
//! Subcommands:
//! - `ppg-recorder [record] [flags]` - Record a session (default)
//! - `ppg-recorder ports` - List serial ports
//! - `ppg-recorder config [flags]` - Print the effective configuration

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ppg_recorder::{
    app::run_recording,
    cancel::{install_ctrl_c_handler, CancelToken},
    config::RecorderConfig,
    device::{list_ports, SerialConnector},
};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ppg-recorder")]
#[command(about = "Record integer samples from a serial sensor to CSV")]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    record: RecordArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session (the default when no subcommand is given)
    Record(RecordArgs),

    /// List serial ports found on this machine
    Ports,

    /// Print the effective configuration as TOML
    Config(RecordArgs),
}

#[derive(Args)]
struct RecordArgs {
    /// TOML config file (default: recorder.toml in the app config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port (e.g. /dev/ttyUSB0, COM15)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Output CSV file (truncated at start)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Recording window in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Wait after opening the port, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Upper bound on a single read, in milliseconds
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Use the synthetic PPG device instead of a serial port
    #[arg(long)]
    simulate: bool,

    /// Write the session summary as JSON to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl RecordArgs {
    /// Config file (or defaults) with command line flags applied on top
    fn effective_config(&self) -> Result<RecorderConfig> {
        let mut config = match self.config {
            Some(ref path) => RecorderConfig::load(path)?,
            None => RecorderConfig::load_default_location()?,
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut RecorderConfig) {
        if let Some(ref port) = self.port {
            config.device.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.device.baud_rate = baud;
        }
        if let Some(ref output) = self.output {
            config.output.path = output.clone();
        }
        if let Some(duration) = self.duration {
            config.session.duration_secs = duration;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.device.settle_ms = settle_ms;
        }
        if let Some(read_timeout_ms) = self.read_timeout_ms {
            config.device.read_timeout_ms = read_timeout_ms;
        }
        if self.simulate {
            config.simulation.enabled = true;
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file path {:?} has no file name", path))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ppg_recorder=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn record(args: &RecordArgs) -> Result<()> {
    let config = args.effective_config()?;

    let cancel = CancelToken::new();
    install_ctrl_c_handler(cancel.clone()).context("Failed to install Ctrl-C handler")?;

    let summary = if config.simulation.enabled {
        tracing::info!("Using synthetic device");
        run_recording(&config, &config.simulation.connector(), &cancel)
    } else {
        run_recording(&config, &SerialConnector, &cancel)
    }?;

    if let Some(ref path) = args.summary {
        summary
            .save_json(path)
            .with_context(|| format!("Failed to write summary to {:?}", path))?;
        tracing::debug!("Summary written to {:?}", path);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ports) => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}", port);
            }
            Ok(())
        }
        Some(Commands::Config(args)) => {
            let config = args.effective_config()?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Some(Commands::Record(args)) => {
            let _guard = init_logging(args.log_file.as_deref())?;
            record(&args)
        }
        None => {
            let _guard = init_logging(cli.record.log_file.as_deref())?;
            tracing::info!("Starting ppg-recorder");
            record(&cli.record)
        }
    }
}
