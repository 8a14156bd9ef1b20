//! Capture buffer shared between the capture loop and the cycle.

use std::sync::Arc;
use thermoplus_hci::RawFrame;
use tokio::sync::Mutex;

/// Ordered list of frames captured since the last drain.
///
/// Cloning gives another handle to the same buffer. The capture loop only
/// appends; the owner of the scanner only drains and restores.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    frames: Arc<Mutex<Vec<RawFrame>>>,
}

impl CaptureBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame in arrival order.
    pub async fn push(&self, frame: RawFrame) {
        self.frames.lock().await.push(frame);
    }

    /// Take every buffered frame, leaving the buffer empty.
    pub async fn take_all(&self) -> Vec<RawFrame> {
        std::mem::take(&mut *self.frames.lock().await)
    }

    /// Put previously taken frames back in front of anything captured since.
    pub async fn restore(&self, mut frames: Vec<RawFrame>) {
        if frames.is_empty() {
            return;
        }
        let mut guard = self.frames.lock().await;
        frames.append(&mut guard);
        *guard = frames;
    }

    /// Number of buffered frames.
    pub async fn len(&self) -> usize {
        self.frames.lock().await.len()
    }

    /// Whether the buffer holds no frames.
    pub async fn is_empty(&self) -> bool {
        self.frames.lock().await.is_empty()
    }
}
