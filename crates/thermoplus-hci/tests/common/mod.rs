//! Shared fixtures for decoder integration tests.
//!
//! The three reference frames were captured from a ThermoBeacon at
//! `06:88:00:00:16:27`:
//!
//! - [`RAW_MEDIUM`] (44 bytes) carries a 19-byte measurement value
//! - [`RAW_LONG`] (46 bytes) carries a longer manufacturer value
//! - [`RAW_SHORT`] (38 bytes) carries only the device name

#![allow(dead_code)]

use thermoplus_hci::RawFrame;

/// 44-byte frame with battery 3132 mV, 24.94 °C, 58.06 %.
pub const RAW_MEDIUM: &str =
    "043e29020100002716000088061d0201060302f0ff15ff110000002716000088063c0c8f01a103b9d70300c8";

/// 46-byte frame whose manufacturer value is not a measurement.
pub const RAW_LONG: &str = "043e2b020100002716000088061f0201060302f0ff17ff11000000271600008806fa019817000054014e730200d6";

/// 38-byte name-only advertisement.
pub const RAW_SHORT: &str =
    "043e2302010400271600008806170d09546865726d6f426561636f6e051218003801020a00d9";

/// Address all reference frames come from.
pub const BEACON_MAC: &str = "06:88:00:00:16:27";

pub fn frame(hex_str: &str) -> RawFrame {
    RawFrame::from_hex(hex_str).expect("reference frame is valid hex")
}

/// Build an advertising report frame for `wire_mac` around `region`.
///
/// `wire_mac` is given in wire order (reversed), as it appears in the frame.
pub fn report_frame(wire_mac: [u8; 6], region: &[u8], rssi: i8) -> RawFrame {
    let mut bytes = vec![0x04, 0x3e, 0x00, 0x02, 0x01, 0x00, 0x00];
    bytes.extend_from_slice(&wire_mac);
    bytes.push(region.len() as u8);
    bytes.extend_from_slice(region);
    bytes.push(0x00);
    bytes.push(rssi.cast_unsigned());
    bytes[2] = (bytes.len() - 3) as u8;
    RawFrame::from(bytes)
}

/// Region holding a name element followed by a measurement element.
///
/// The measurement element is the last one in the region and is sized so
/// that its value is exactly 19 bytes.
pub fn beacon_region(name: &str, battery: u16, temperature_raw: u16, humidity_raw: u16) -> Vec<u8> {
    let mut region = vec![(name.len() + 1) as u8, 0x09];
    region.extend_from_slice(name.as_bytes());

    let mut value = vec![0u8; 10];
    value.extend_from_slice(&battery.to_le_bytes());
    value.extend_from_slice(&temperature_raw.to_le_bytes());
    value.extend_from_slice(&humidity_raw.to_le_bytes());
    value.resize(19, 0);

    region.push(20);
    region.push(0xff);
    region.extend_from_slice(&value);
    region
}
