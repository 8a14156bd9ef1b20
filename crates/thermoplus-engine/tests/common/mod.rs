//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use std::time::Duration;
use thermoplus_core::{Config, MacAddress};
use thermoplus_engine::Processor;

/// Reference frame carrying a ThermoBeacon measurement.
pub const RAW_MEDIUM: &str =
    "043e29020100002716000088061d0201060302f0ff15ff110000002716000088063c0c8f01a103b9d70300c8";

/// Reference frame whose manufacturer value is too long for a measurement.
pub const RAW_LONG: &str =
    "043e2b020100002716000088061f0201060302f0ff17ff11000000271600008806fa019817000054014e730200d6";

/// Reference frame carrying the ThermoBeacon name.
pub const RAW_SHORT: &str =
    "043e2302010400271600008806170d09546865726d6f426561636f6e051218003801020a00d9";

/// Address of the reference beacon.
pub fn beacon_mac() -> MacAddress {
    "06:88:00:00:16:27".parse().unwrap()
}

/// Configuration with a one second period and a short stop timeout.
pub fn test_config() -> Config {
    Config {
        period_secs: 1,
        stop_timeout_secs: 1,
        ..Config::default()
    }
}

/// Wait until the processor's scanner buffers at least `expected` frames.
pub async fn wait_for_buffered(processor: &Processor, expected: usize) {
    for _ in 0..400 {
        if processor.scanner().buffered_len().await >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("scanner never buffered {} frames", expected);
}
