//! ThermoBeacon capture and reconciliation driver.
//!
//! `thermoplus run` replays a hex capture file through the scanner and
//! prints registry events as JSON lines. `thermoplus decode` decodes frames
//! given on the command line.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thermoplus_core::Config;
use thermoplus_engine::Processor;
use thermoplus_hci::{RawFrame, decode_report, decode_sensor, is_target_device};
use thermoplus_scanner::HexDumpSource;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thermoplus")]
#[command(about = "ThermoBeacon BLE advertisement capture and decoding", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture frames from a hex dump and reconcile them periodically
    Run {
        /// Hex capture file, one frame per line
        #[arg(short, long)]
        dump: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HCI interface index
        #[arg(short, long)]
        interface: Option<u16>,

        /// Seconds between reconciliation cycles
        #[arg(short, long)]
        period: Option<u64>,

        /// Log every captured frame in hex
        #[arg(long)]
        hci_dump: bool,
    },
    /// Decode hex-encoded frames and print the result
    Decode {
        /// Frames in hex
        #[arg(required = true)]
        frames: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            dump,
            config,
            interface,
            period,
            hci_dump,
        } => {
            let config = load_config(config, interface, period, hci_dump)?;
            run(dump, config).await
        }
        Commands::Decode { frames } => decode(&frames),
    }
}

fn load_config(
    path: Option<PathBuf>,
    interface: Option<u16>,
    period: Option<u64>,
    hci_dump: bool,
) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(interface) = interface {
        config.hci_interface = interface;
    }
    if let Some(period) = period {
        config.period_secs = period;
    }
    config.hci_dump |= hci_dump;

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run(dump: PathBuf, config: Config) -> Result<()> {
    let mut processor = Processor::new(HexDumpSource::new(dump), &config);
    let mut events = processor.subscribe();

    processor
        .start()
        .await
        .context("failed to start capture")?;

    let cancel = CancellationToken::new();
    let mut runner = tokio::spawn(processor.run(cancel.clone()));

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to encode event: {}", e),
            }
        }
    });

    // The runner only finishes on its own when capture failed for good.
    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("Interrupted, shutting down");
            cancel.cancel();
            (&mut runner).await
        }
        outcome = &mut runner => outcome,
    };

    outcome
        .context("reconciliation task failed")?
        .context("capture stopped")?;
    printer.await.context("event printer failed")?;
    Ok(())
}

fn decode(frames: &[String]) -> Result<()> {
    let mut decoded = 0;

    for hex_str in frames {
        let frame = RawFrame::from_hex(hex_str)
            .with_context(|| format!("invalid frame {}", hex_str))?;

        let Some(report) = decode_report(&frame) else {
            println!("{}", serde_json::json!({ "frame": hex_str, "report": null }));
            continue;
        };
        decoded += 1;

        let output = serde_json::json!({
            "frame": hex_str,
            "report": &report,
            "target_device": is_target_device(&report),
            "reading": decode_sensor(&report).map(|r| r.rounded(2)),
        });
        println!("{}", output);
    }

    if decoded == 0 {
        bail!("no advertising reports among {} frames", frames.len());
    }
    Ok(())
}
