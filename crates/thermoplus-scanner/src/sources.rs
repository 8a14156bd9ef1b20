//! Enum wrapper for frame source dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn FrameSource>`
//! is not available. [`AnyFrameSource`] gives the scanner one concrete type
//! to own and move into its capture task.
//!
//! # Examples
//!
//! ```
//! use thermoplus_scanner::sources::AnyFrameSource;
//! use thermoplus_scanner::mock::MockFrameSource;
//! use thermoplus_scanner::traits::FrameSource;
//!
//! let (source, _handle) = MockFrameSource::new();
//! let any_source = AnyFrameSource::from(source);
//! assert_eq!(any_source.describe(), "Mock HCI Radio");
//! ```

use crate::error::Result;
use crate::hex_dump::HexDumpSource;
use crate::mock::MockFrameSource;
use crate::traits::FrameSource;
use thermoplus_hci::RawFrame;

/// Enum wrapper for frame source dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyFrameSource {
    /// Simulated radio for development and testing.
    Mock(MockFrameSource),

    /// Replay of a hex capture file.
    HexDump(HexDumpSource),
}

impl FrameSource for AnyFrameSource {
    async fn acquire(&mut self, interface: u16) -> Result<()> {
        match self {
            Self::Mock(source) => source.acquire(interface).await,
            Self::HexDump(source) => source.acquire(interface).await,
        }
    }

    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        match self {
            Self::Mock(source) => source.next_frame().await,
            Self::HexDump(source) => source.next_frame().await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(source) => source.release().await,
            Self::HexDump(source) => source.release().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Mock(source) => source.describe(),
            Self::HexDump(source) => source.describe(),
        }
    }
}

impl From<MockFrameSource> for AnyFrameSource {
    fn from(source: MockFrameSource) -> Self {
        Self::Mock(source)
    }
}

impl From<HexDumpSource> for AnyFrameSource {
    fn from(source: HexDumpSource) -> Self {
        Self::HexDump(source)
    }
}
