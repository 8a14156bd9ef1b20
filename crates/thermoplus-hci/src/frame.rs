//! Raw HCI event frames as captured from the controller.

use bytes::Bytes;
use std::fmt;
use thermoplus_core::{Error, Result};

/// One HCI event exactly as the controller delivered it.
///
/// Frames are immutable and cheap to clone; the capture buffer holds them
/// until a reconciliation cycle takes the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFrame(Bytes);

impl RawFrame {
    /// Wrap captured bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        RawFrame(data.into())
    }

    /// Parse a frame from a hex string.
    ///
    /// Whitespace anywhere in the input is ignored, so `btmon`-style spaced
    /// dumps are accepted.
    ///
    /// # Errors
    /// Returns `Error::InvalidHex` if the input contains non-hex characters
    /// or an odd number of digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermoplus_hci::RawFrame;
    ///
    /// let frame = RawFrame::from_hex("04 3e 02").unwrap();
    /// assert_eq!(frame.as_bytes(), &[0x04, 0x3e, 0x02]);
    ///
    /// assert!(RawFrame::from_hex("04 3").is_err());
    /// ```
    pub fn from_hex(input: &str) -> Result<Self> {
        let clean: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = hex::decode(&clean).map_err(|e| Error::InvalidHex(format!("{e}: {clean}")))?;
        Ok(RawFrame(Bytes::from(bytes)))
    }

    /// Frame contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the frame carries no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering, as written to capture dumps.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for RawFrame {
    fn from(data: Vec<u8>) -> Self {
        RawFrame(Bytes::from(data))
    }
}

impl From<&'static [u8]> for RawFrame {
    fn from(data: &'static [u8]) -> Self {
        RawFrame(Bytes::from_static(data))
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
