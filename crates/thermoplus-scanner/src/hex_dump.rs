//! Frame source that replays a hex capture file.
//!
//! The file holds one hex-encoded HCI frame per line, as produced by
//! `hcidump --raw` style tooling after whitespace is stripped. Lines starting
//! with `#` and blank lines are ignored. When the end of the file is reached
//! the source keeps polling, so a file that is still being written is
//! tailed like a live radio. A line only counts once its newline has been
//! written; a partially flushed line is held back until it is complete.
//!
//! The read position survives `release`/`acquire`, so restarting the
//! scanner never replays a line.

use crate::{ScannerError, error::Result, traits::FrameSource};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thermoplus_hci::RawFrame;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Delay between polls once the end of the file has been reached.
const EOF_POLL_INTERVAL_MS: u64 = 200;

/// Hex capture file replay.
#[derive(Debug)]
pub struct HexDumpSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,

    /// Bytes of the current line read so far; kept across polls and
    /// cancelled reads.
    pending: Vec<u8>,

    acquired: bool,
    line_number: usize,
    poll_interval: Duration,
}

impl HexDumpSource {
    /// Create a source for the given capture file.
    ///
    /// The file is opened on the first `acquire`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
            pending: Vec::new(),
            acquired: false,
            line_number: 0,
            poll_interval: Duration::from_millis(EOF_POLL_INTERVAL_MS),
        }
    }

    /// Override the end-of-file poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Path of the capture file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

impl FrameSource for HexDumpSource {
    async fn acquire(&mut self, interface: u16) -> Result<()> {
        if self.acquired {
            return Err(ScannerError::acquisition_failed(
                interface,
                format!("{} is already open", self.path.display()),
            ));
        }

        if self.reader.is_none() {
            let file = File::open(&self.path).await.map_err(|e| {
                ScannerError::acquisition_failed(
                    interface,
                    format!("{}: {}", self.path.display(), e),
                )
            })?;
            self.reader = Some(BufReader::new(file));
            debug!("Opened capture file {}", self.path.display());
        }

        self.acquired = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if !self.acquired {
            return Err(ScannerError::disconnected(self.describe()));
        }
        let Some(reader) = self.reader.as_mut() else {
            return Err(ScannerError::disconnected(self.describe()));
        };

        loop {
            // A cancelled `read_until` leaves what it read in `pending`.
            reader.read_until(b'\n', &mut self.pending).await?;

            if self.pending.last() != Some(&b'\n') {
                // End of file, possibly mid-line.
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }

            let line = std::mem::take(&mut self.pending);
            self.line_number += 1;

            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return RawFrame::from_hex(trimmed).map(Some).map_err(|e| {
                ScannerError::invalid_data(format!(
                    "{} line {}: {}",
                    self.path.display(),
                    self.line_number,
                    e
                ))
            });
        }
    }

    async fn release(&mut self) -> Result<()> {
        self.acquired = false;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("hex dump {}", self.path.display())
    }
}
