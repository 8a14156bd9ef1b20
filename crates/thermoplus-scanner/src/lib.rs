//! Radio capture for the Thermoplus BLE bridge.
//!
//! This crate owns the only long-running piece of the system: a capture loop
//! that reads HCI frames from a radio and buffers them until the next
//! reconciliation cycle collects them.
//!
//! # Frame Sources
//!
//! The [`FrameSource`] trait abstracts the radio. Two implementations ship
//! with the crate:
//!
//! - [`MockFrameSource`](mock::MockFrameSource): a channel-backed simulated
//!   radio controlled through a handle, for tests and development.
//! - [`HexDumpSource`](hex_dump::HexDumpSource): replays (and tails) a file
//!   of hex-encoded frames.
//!
//! ```no_run
//! use thermoplus_scanner::traits::FrameSource;
//! use thermoplus_scanner::Result;
//!
//! async fn count_frames<S: FrameSource>(source: &mut S) -> Result<usize> {
//!     source.acquire(0).await?;
//!     let mut count = 0;
//!     while source.next_frame().await?.is_some() {
//!         count += 1;
//!     }
//!     source.release().await?;
//!     Ok(count)
//! }
//! ```
//!
//! # Scanner
//!
//! [`Scanner`] runs the capture loop on a tokio task and hands buffered
//! frames off through [`Scanner::swap_and_restart`]. See the [`scanner`]
//! module for the hand-off guarantees.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with the
//! [`ScannerError`] type. Decoding problems never surface here; frames are
//! captured as opaque bytes.

pub mod buffer;
pub mod error;
pub mod hex_dump;
pub mod mock;
pub mod scanner;
pub mod sources;
pub mod traits;

// Re-export commonly used types for convenience
pub use buffer::CaptureBuffer;
pub use error::{Result, ScannerError};
pub use hex_dump::HexDumpSource;
pub use mock::{MockFrameSource, MockFrameSourceHandle};
pub use scanner::{Scanner, ScannerConfig};
pub use sources::AnyFrameSource;
pub use traits::FrameSource;
