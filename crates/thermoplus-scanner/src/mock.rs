//! Mock frame source for testing and development.
//!
//! This module provides a simulated radio that can be fed frames
//! programmatically, so the scanner lifecycle can be exercised without a
//! Bluetooth adapter or elevated privileges.

use crate::{ScannerError, error::Result, traits::FrameSource};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;
use thermoplus_hci::RawFrame;
use tokio::sync::mpsc;

/// How often a hanging `release` checks whether it may finish.
const HANG_POLL_INTERVAL_MS: u64 = 10;

/// Mock radio for testing and development.
///
/// Frames injected through the [`MockFrameSourceHandle`] are delivered in
/// order. The channel outlives stop/start cycles, so frames injected while
/// the scanner is restarting are delivered by the next capture loop.
///
/// # Examples
///
/// ```
/// use thermoplus_scanner::mock::MockFrameSource;
/// use thermoplus_scanner::traits::FrameSource;
///
/// #[tokio::main]
/// async fn main() -> thermoplus_scanner::Result<()> {
///     let (mut source, handle) = MockFrameSource::new();
///
///     handle.fail_next_acquire();
///     assert!(source.acquire(0).await.is_err());
///
///     source.acquire(0).await?;
///     assert!(handle.is_acquired());
///
///     source.release().await?;
///     assert!(!handle.is_acquired());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockFrameSource {
    /// Channel receiver for injected frames
    frame_rx: mpsc::UnboundedReceiver<RawFrame>,

    /// State shared with the handle
    state: Arc<MockState>,

    /// Source name
    name: String,

    /// Interface currently held
    interface: Option<u16>,
}

#[derive(Debug, Default)]
struct MockState {
    acquired: AtomicBool,
    fail_next_acquire: AtomicBool,
    hang_on_release: AtomicBool,
    panic_on_next_frame: AtomicBool,
    acquisitions: AtomicUsize,
}

impl MockFrameSource {
    /// Create a new mock source with the default name.
    ///
    /// Returns a tuple of (MockFrameSource, MockFrameSourceHandle) where the
    /// handle is used to inject frames and control failures.
    pub fn new() -> (Self, MockFrameSourceHandle) {
        Self::with_name("Mock HCI Radio".to_string())
    }

    /// Create a new mock source with a custom name.
    pub fn with_name(name: String) -> (Self, MockFrameSourceHandle) {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let state = Arc::new(MockState::default());

        let source = Self {
            frame_rx,
            state: Arc::clone(&state),
            name,
            interface: None,
        };

        let handle = MockFrameSourceHandle { frame_tx, state };

        (source, handle)
    }
}

impl FrameSource for MockFrameSource {
    async fn acquire(&mut self, interface: u16) -> Result<()> {
        if self.state.fail_next_acquire.swap(false, Ordering::SeqCst) {
            return Err(ScannerError::acquisition_failed(
                interface,
                "Device or resource busy",
            ));
        }
        if self.state.acquired.swap(true, Ordering::SeqCst) {
            return Err(ScannerError::acquisition_failed(
                interface,
                "interface already held",
            ));
        }

        self.interface = Some(interface);
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.interface.is_none() {
            return Err(ScannerError::disconnected(format!(
                "{} is not acquired",
                self.name
            )));
        }

        let frame = self
            .frame_rx
            .recv()
            .await
            .ok_or_else(|| ScannerError::disconnected("mock frame channel closed"))?;

        if self.state.panic_on_next_frame.swap(false, Ordering::SeqCst) {
            panic!("{} crashed while delivering a frame", self.name);
        }
        Ok(Some(frame))
    }

    async fn release(&mut self) -> Result<()> {
        while self.state.hang_on_release.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(HANG_POLL_INTERVAL_MS)).await;
        }

        self.interface = None;
        self.state.acquired.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Handle for controlling a mock frame source.
///
/// # Examples
///
/// ```
/// use thermoplus_scanner::mock::MockFrameSource;
///
/// let (_source, handle) = MockFrameSource::new();
///
/// handle.inject_hex("043e2302010400271600008806170d09546865726d6f426561636f6e051218003801020a00d9").unwrap();
/// assert!(handle.inject_hex("not hex").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockFrameSourceHandle {
    /// Channel sender for injected frames
    frame_tx: mpsc::UnboundedSender<RawFrame>,

    /// State shared with the source
    state: Arc<MockState>,
}

impl MockFrameSourceHandle {
    /// Deliver a frame to the source.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::Disconnected` if the source has been dropped.
    pub fn inject(&self, frame: impl Into<RawFrame>) -> Result<()> {
        self.frame_tx
            .send(frame.into())
            .map_err(|_| ScannerError::disconnected("mock frame source dropped"))
    }

    /// Deliver a hex-encoded frame to the source.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::InvalidData` for malformed hex, otherwise the
    /// same errors as [`inject`](Self::inject).
    pub fn inject_hex(&self, hex_str: &str) -> Result<()> {
        let frame =
            RawFrame::from_hex(hex_str).map_err(|e| ScannerError::invalid_data(e.to_string()))?;
        self.inject(frame)
    }

    /// Make the next `acquire` call fail once.
    pub fn fail_next_acquire(&self) {
        self.state.fail_next_acquire.store(true, Ordering::SeqCst);
    }

    /// Make `release` block until this is cleared again.
    pub fn set_hang_on_release(&self, hang: bool) {
        self.state.hang_on_release.store(hang, Ordering::SeqCst);
    }

    /// Make the source panic when it receives the next injected frame.
    ///
    /// Simulates a crashed capture task.
    pub fn panic_on_next_frame(&self) {
        self.state.panic_on_next_frame.store(true, Ordering::SeqCst);
    }

    /// Whether the source currently holds the interface.
    pub fn is_acquired(&self) -> bool {
        self.state.acquired.load(Ordering::SeqCst)
    }

    /// Number of successful acquisitions so far.
    pub fn acquisition_count(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }
}
