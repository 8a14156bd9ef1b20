//! Periodic reconciliation cycle.
//!
//! The [`Processor`] ties the scanner to the registry. Each cycle swaps the
//! capture buffer, restarts the capture loop, and feeds the taken frames to
//! the registry. Scanner failures skip the cycle. Only a scanner that lost
//! its frame source to a panicked capture task ends [`Processor::run`].
//!
//! # Examples
//!
//! ```
//! use thermoplus_core::Config;
//! use thermoplus_engine::{CycleOutcome, Processor};
//! use thermoplus_scanner::MockFrameSource;
//!
//! #[tokio::main]
//! async fn main() -> thermoplus_scanner::Result<()> {
//!     let (source, _handle) = MockFrameSource::new();
//!     let mut processor = Processor::new(source, &Config::default());
//!
//!     processor.start().await?;
//!     let outcome = processor.run_cycle().await;
//!     assert!(matches!(outcome, CycleOutcome::Processed(summary) if summary.frames == 0));
//!
//!     processor.shutdown().await
//! }
//! ```

use crate::registry::{DeviceRegistry, IngestSummary, RegistryEvent};
use std::time::Duration;
use thermoplus_core::Config;
use thermoplus_scanner::{AnyFrameSource, Result, Scanner, ScannerConfig, ScannerError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The scanner could not hand off frames; the registry was not touched.
    Skipped,

    /// The batch was ingested.
    Processed(IngestSummary),
}

/// Scanner plus registry, driven on a fixed period.
#[derive(Debug)]
pub struct Processor {
    scanner: Scanner,
    registry: DeviceRegistry,
    period: Duration,
}

impl Processor {
    /// Create an idle processor around a frame source.
    pub fn new(source: impl Into<AnyFrameSource>, config: &Config) -> Self {
        Self {
            scanner: Scanner::new(source, ScannerConfig::from(config)),
            registry: DeviceRegistry::new(config),
            period: config.period(),
        }
    }

    /// Start receiving registry events. See [`DeviceRegistry::subscribe`].
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RegistryEvent> {
        self.registry.subscribe()
    }

    /// Start the capture loop.
    ///
    /// # Errors
    ///
    /// Same as [`Scanner::start`].
    pub async fn start(&mut self) -> Result<()> {
        self.scanner.start().await
    }

    /// Run one reconciliation cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let frames = match self.scanner.swap_and_restart().await {
            Ok(frames) => frames,
            Err(e) => {
                error!("Skipping cycle: {}", e);
                return CycleOutcome::Skipped;
            }
        };

        let summary = self.registry.ingest(frames);
        info!(
            "Cycle processed {} frames: {} reports, {} discovered, {} updated",
            summary.frames, summary.reports, summary.discovered, summary.updated
        );
        CycleOutcome::Processed(summary)
    }

    /// Run cycles every period until `cancel` fires, then shut down.
    ///
    /// The scanner is started first if it is not already running; a failed
    /// start is logged and retried by the first cycle. The next cycle is
    /// scheduled only after the previous one finished, so cycles never
    /// overlap.
    ///
    /// # Errors
    ///
    /// - `ScannerError::SourceUnavailable` without waiting for `cancel` once
    ///   the scanner has failed for good (see [`Scanner::is_failed`]).
    /// - Otherwise the error from the final [`Scanner::shutdown`].
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        if !self.scanner.is_running()
            && let Err(e) = self.scanner.start().await
        {
            error!("Initial capture start failed: {}", e);
        }

        info!("Reconciling every {}s", self.period.as_secs());

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.period) => {
                    self.run_cycle().await;
                }
            }

            if self.scanner.is_failed() {
                error!("Frame source lost with a failed capture task; giving up");
                return Err(ScannerError::source_unavailable(
                    "frame source lost with a failed capture task",
                ));
            }
        }

        info!("Stopping reconciliation");
        self.shutdown().await
    }

    /// Stop capturing and release the radio.
    ///
    /// # Errors
    ///
    /// Same as [`Scanner::shutdown`].
    pub async fn shutdown(self) -> Result<()> {
        self.scanner.shutdown().await
    }

    /// The device registry.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// The scanner.
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Reconciliation period.
    pub fn period(&self) -> Duration {
        self.period
    }
}
