//! Shared helpers for scanner integration tests.

#![allow(dead_code)]

use std::time::Duration;
use thermoplus_hci::RawFrame;
use thermoplus_scanner::{Scanner, ScannerConfig};

/// Reference frame carrying a ThermoBeacon measurement.
pub const RAW_MEDIUM: &str =
    "043e29020100002716000088061d0201060302f0ff15ff110000002716000088063c0c8f01a103b9d70300c8";

/// Reference frame carrying the ThermoBeacon name.
pub const RAW_SHORT: &str =
    "043e2302010400271600008806170d09546865726d6f426561636f6e051218003801020a00d9";

/// Scanner settings with a short stop timeout.
pub fn fast_config() -> ScannerConfig {
    ScannerConfig {
        stop_timeout: Duration::from_millis(250),
        ..ScannerConfig::default()
    }
}

/// Distinct numbered frame.
pub fn numbered_frame(n: u32) -> RawFrame {
    let mut bytes = vec![0x04, 0x3e, 0x00, 0x02];
    bytes.extend_from_slice(&n.to_be_bytes());
    RawFrame::from(bytes)
}

/// Recover the number from a frame built by [`numbered_frame`].
pub fn frame_number(frame: &RawFrame) -> u32 {
    let bytes = frame.as_bytes();
    u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]])
}

/// Wait until the scanner buffers at least `expected` frames.
pub async fn wait_for_buffered(scanner: &Scanner, expected: usize) {
    for _ in 0..400 {
        if scanner.buffered_len().await >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {} buffered frames, found {}",
        expected,
        scanner.buffered_len().await
    );
}
