//! Frame source trait definition.
//!
//! A frame source stands between the scanner and the radio. It hands out
//! HCI frames one at a time while it holds the interface. The scanner drives
//! the lifecycle: `acquire` before the capture loop starts, `next_frame` in
//! the loop, `release` on every loop exit path.
//!
//! The trait uses native `async fn` (Rust 1.90 + Edition 2024 RPITIT), so it
//! is not object-safe; dispatch goes through
//! [`AnyFrameSource`](crate::sources::AnyFrameSource).

#![allow(async_fn_in_trait)]

use crate::error::Result;
use thermoplus_hci::RawFrame;

/// A provider of raw HCI frames.
///
/// # Cancellation
///
/// The capture loop races `next_frame` against its stop signal and drops the
/// pending future when the signal wins. Implementations must not lose or
/// duplicate a frame when that happens.
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
///     source.acquire(0).await?;
///     handle.inject_hex("043e0002")?;
///
///     let frame = source.next_frame().await?.unwrap();
///     assert_eq!(frame.len(), 4);
///
///     source.release().await?;
///     Ok(())
/// }
/// ```
pub trait FrameSource: Send {
    /// Take exclusive hold of the radio interface.
    ///
    /// # Errors
    ///
    /// Returns `ScannerError::AcquisitionFailed` if the interface cannot be
    /// opened or is already held.
    async fn acquire(&mut self, interface: u16) -> Result<()>;

    /// Wait for the next frame.
    ///
    /// Returns `Ok(None)` when the source has no more frames to give.
    ///
    /// # Errors
    ///
    /// `ScannerError::Disconnected` ends the capture loop; any other error
    /// is logged and the loop keeps reading.
    async fn next_frame(&mut self) -> Result<Option<RawFrame>>;

    /// Give the radio interface back.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface could not be released cleanly.
    async fn release(&mut self) -> Result<()>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}
