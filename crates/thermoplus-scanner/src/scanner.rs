//! Scanner: capture loop lifecycle and buffer hand-off.
//!
//! The scanner owns one frame source. While running, a tokio task holds the
//! source and appends every frame it delivers to the [`CaptureBuffer`]. The
//! owner periodically calls [`Scanner::swap_and_restart`] to stop the loop,
//! take the buffered frames and start a fresh loop.
//!
//! # Hand-off Guarantees
//!
//! - Frames are handed off in arrival order, each exactly once.
//! - A stop timeout leaves the loop running and the buffer untouched.
//! - A failed restart puts the taken frames back in front of the buffer.
//! - The radio is released on every loop exit path.
//!
//! # Examples
//!
//! ```
//! use thermoplus_scanner::{Scanner, ScannerConfig};
//! use thermoplus_scanner::mock::MockFrameSource;
//!
//! #[tokio::main]
//! async fn main() -> thermoplus_scanner::Result<()> {
//!     let (source, handle) = MockFrameSource::new();
//!     let mut scanner = Scanner::new(source, ScannerConfig::default());
//!
//!     scanner.start().await?;
//!     assert!(handle.is_acquired());
//!
//!     let frames = scanner.swap_and_restart().await?;
//!     assert!(frames.is_empty());
//!
//!     scanner.shutdown().await?;
//!     assert!(!handle.is_acquired());
//!     Ok(())
//! }
//! ```

use crate::buffer::CaptureBuffer;
use crate::error::{Result, ScannerError};
use crate::sources::AnyFrameSource;
use crate::traits::FrameSource;
use std::time::Duration;
use thermoplus_core::{
    Config,
    constants::{DEFAULT_HCI_INTERFACE, DEFAULT_STOP_TIMEOUT_SECS},
};
use thermoplus_hci::RawFrame;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Back-off after a source error that does not end the loop.
const ERROR_BACKOFF_MS: u64 = 100;

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// HCI interface index.
    pub interface: u16,

    /// How long `stop` waits for the capture loop.
    pub stop_timeout: Duration,

    /// Log every captured frame in hex.
    pub hci_dump: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_HCI_INTERFACE,
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
            hci_dump: false,
        }
    }
}

impl From<&Config> for ScannerConfig {
    fn from(config: &Config) -> Self {
        Self {
            interface: config.hci_interface,
            stop_timeout: config.stop_timeout(),
            hci_dump: config.hci_dump,
        }
    }
}

/// A running capture loop.
#[derive(Debug)]
struct CaptureTask {
    cancel: CancellationToken,
    handle: JoinHandle<AnyFrameSource>,
}

/// Radio capture with periodic buffer hand-off.
///
/// # Terminal State
///
/// The frame source lives inside the capture task while it runs. If that
/// task panics the source is lost with it: `stop` reports
/// `ScannerError::TaskFailed` once, and from then on [`is_failed`] is true
/// and every `start` returns `ScannerError::SourceUnavailable`. Callers
/// should treat a failed scanner as finished.
///
/// [`is_failed`]: Scanner::is_failed
#[derive(Debug)]
pub struct Scanner {
    config: ScannerConfig,

    /// Source held while idle; moved into the capture task while running.
    source: Option<AnyFrameSource>,

    buffer: CaptureBuffer,
    task: Option<CaptureTask>,
}

impl Scanner {
    /// Create an idle scanner around a frame source.
    pub fn new(source: impl Into<AnyFrameSource>, config: ScannerConfig) -> Self {
        Self {
            config,
            source: Some(source.into()),
            buffer: CaptureBuffer::new(),
            task: None,
        }
    }

    /// Acquire the radio and start the capture loop.
    ///
    /// # Errors
    ///
    /// - `ScannerError::AlreadyRunning` if a capture loop exists.
    /// - `ScannerError::SourceUnavailable` if the source was lost with a
    ///   panicked capture task; this is permanent (see [`Scanner::is_failed`]).
    /// - `ScannerError::AcquisitionFailed` if the radio cannot be acquired;
    ///   no frames are taken and the scanner stays idle.
    pub async fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Err(ScannerError::AlreadyRunning);
        }
        let mut source = self.source.take().ok_or_else(|| {
            ScannerError::source_unavailable("frame source was lost with a failed capture task")
        })?;

        let interface = self.config.interface;
        if let Err(e) = source.acquire(interface).await {
            error!("Failed to start capture via {}: {}", source.describe(), e);
            self.source = Some(source);
            return Err(e);
        }

        info!("Capturing on hci{} via {}", interface, source.describe());

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            source,
            self.buffer.clone(),
            cancel.clone(),
            interface,
            self.config.hci_dump,
        ));
        self.task = Some(CaptureTask { cancel, handle });
        Ok(())
    }

    /// Signal the capture loop and wait for it to finish.
    ///
    /// Returns `Ok(())` immediately if no loop exists.
    ///
    /// # Errors
    ///
    /// - `ScannerError::StopTimeout` if the loop does not finish within the
    ///   stop timeout. The loop keeps running and a later `stop` may succeed.
    /// - `ScannerError::TaskFailed` if the capture task panicked.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        task.cancel.cancel();

        match tokio::time::timeout(self.config.stop_timeout, &mut task.handle).await {
            Ok(Ok(source)) => {
                debug!("Capture loop stopped");
                self.source = Some(source);
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Capture task ended abnormally: {}", e);
                Err(ScannerError::task_failed(e.to_string()))
            }
            Err(_) => {
                let duration_ms =
                    u64::try_from(self.config.stop_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("Capture loop did not stop within {}ms", duration_ms);
                self.task = Some(task);
                Err(ScannerError::stop_timeout(duration_ms))
            }
        }
    }

    /// Stop, take every buffered frame, and start again.
    ///
    /// The returned frames are in arrival order and are never returned by a
    /// later call.
    ///
    /// # Errors
    ///
    /// If stopping fails the error is returned and the buffer is untouched.
    /// If restarting fails the frames are put back in front of the buffer
    /// and the error is returned.
    pub async fn swap_and_restart(&mut self) -> Result<Vec<RawFrame>> {
        self.stop().await?;

        let frames = self.buffer.take_all().await;

        if let Err(e) = self.start().await {
            self.buffer.restore(frames).await;
            return Err(e);
        }

        debug!("Handing off {} frames", frames.len());
        Ok(frames)
    }

    /// Stop capturing and release the radio for good.
    ///
    /// # Errors
    ///
    /// Same as [`stop`](Self::stop). On a stop timeout the loop is cancelled
    /// and left to finish in the background.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down scanner on hci{}", self.config.interface);
        self.stop().await
    }

    /// Whether the frame source was lost with a panicked capture task.
    ///
    /// A failed scanner can never start again.
    pub fn is_failed(&self) -> bool {
        self.source.is_none() && self.task.is_none()
    }

    /// Whether a capture loop is alive.
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Number of frames waiting for the next hand-off.
    pub async fn buffered_len(&self) -> usize {
        self.buffer.len().await
    }

    /// Configured HCI interface index.
    pub fn interface(&self) -> u16 {
        self.config.interface
    }

    /// Scanner settings.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.cancel.cancel();
        }
    }
}

/// Receive frames until cancelled or the source goes away, then release it.
async fn capture_loop(
    mut source: AnyFrameSource,
    buffer: CaptureBuffer,
    cancel: CancellationToken,
    interface: u16,
    hci_dump: bool,
) -> AnyFrameSource {
    let mut captured: u64 = 0;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            result = source.next_frame() => match result {
                Ok(Some(frame)) => {
                    if hci_dump {
                        debug!("hci{} > {}", interface, frame);
                    }
                    buffer.push(frame).await;
                    captured += 1;
                }
                Ok(None) => {
                    warn!("Frame source on hci{} reached end of stream", interface);
                    break;
                }
                Err(e) if e.is_disconnect() => {
                    warn!("Frame source on hci{} went away: {}", interface, e);
                    break;
                }
                Err(ScannerError::InvalidData { message }) => {
                    debug!("Skipping undecodable input: {}", message);
                }
                Err(e) => {
                    warn!("Frame source error on hci{}: {}", interface, e);
                    tokio::time::sleep(Duration::from_millis(ERROR_BACKOFF_MS)).await;
                }
            },
        }
    }

    if let Err(e) = source.release().await {
        warn!("Failed to release hci{}: {}", interface, e);
    }
    debug!("Capture loop on hci{} ended after {} frames", interface, captured);

    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFrameSource;

    fn config() -> ScannerConfig {
        ScannerConfig {
            stop_timeout: Duration::from_millis(200),
            ..ScannerConfig::default()
        }
    }

    async fn wait_for_buffered(scanner: &Scanner, expected: usize) {
        for _ in 0..200 {
            if scanner.buffered_len().await >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("buffer never reached {} frames", expected);
    }

    #[test]
    fn test_config_from_core_config() {
        let core = Config {
            hci_interface: 2,
            stop_timeout_secs: 3,
            hci_dump: true,
            ..Config::default()
        };
        let config = ScannerConfig::from(&core);
        assert_eq!(config.interface, 2);
        assert_eq!(config.stop_timeout, Duration::from_secs(3));
        assert!(config.hci_dump);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let (source, _handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());

        scanner.start().await.unwrap();
        assert!(matches!(
            scanner.start().await,
            Err(ScannerError::AlreadyRunning)
        ));
        assert!(scanner.is_running());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_ok() {
        let (source, _handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());
        assert!(scanner.stop().await.is_ok());
        assert!(!scanner.is_running());
    }

    #[tokio::test]
    async fn test_frames_buffered_and_handed_off() {
        let (source, handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());
        scanner.start().await.unwrap();

        handle.inject(vec![0x04, 0x01]).unwrap();
        handle.inject(vec![0x04, 0x02]).unwrap();
        wait_for_buffered(&scanner, 2).await;

        let frames = scanner.swap_and_restart().await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), &[0x04, 0x01]);
        assert_eq!(frames[1].as_bytes(), &[0x04, 0x02]);
        assert_eq!(scanner.buffered_len().await, 0);
        assert!(scanner.is_running());
    }

    #[tokio::test]
    async fn test_loop_ends_when_source_disconnects() {
        let (source, handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());
        scanner.start().await.unwrap();

        drop(handle);

        for _ in 0..200 {
            if !scanner.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!scanner.is_running());
        assert!(scanner.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_panicked_task_is_terminal() {
        let (source, handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());
        scanner.start().await.unwrap();
        assert!(!scanner.is_failed());

        handle.panic_on_next_frame();
        handle.inject(vec![0x04, 0x01]).unwrap();
        for _ in 0..200 {
            if !scanner.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(matches!(
            scanner.stop().await,
            Err(ScannerError::TaskFailed { .. })
        ));
        assert!(scanner.is_failed());
        assert!(matches!(
            scanner.start().await,
            Err(ScannerError::SourceUnavailable { .. })
        ));
        assert!(scanner.is_failed());
    }

    #[tokio::test]
    async fn test_drop_cancels_loop() {
        let (source, handle) = MockFrameSource::new();
        let mut scanner = Scanner::new(source, config());
        scanner.start().await.unwrap();
        drop(scanner);

        for _ in 0..200 {
            if !handle.is_acquired() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!handle.is_acquired());
    }
}
