//! Wire-level and behavioural constants for ThermoBeacon advertisement capture.
//!
//! The frame layout constants describe an HCI LE Advertising Report as it is
//! delivered by a Bluetooth controller on a raw HCI socket:
//!
//! ```text
//! offset  0     1     2     3     4..6        7..12        13     14..len-2        len-1
//!       ┌─────┬─────┬─────┬─────┬──────────┬────────────┬──────┬─────────────────┬──────┐
//!       │ 04  │ 3E  │ len │ 02  │ reports, │ address    │ data │ advertising     │ RSSI │
//!       │ pkt │ evt │     │ sub │ evt type │ (reversed) │ len  │ data region     │ (i8) │
//!       └─────┴─────┴─────┴─────┴──────────┴────────────┴──────┴─────────────────┴──────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use thermoplus_core::constants::*;
//!
//! assert_eq!(HCI_EVENT_PACKET, 0x04);
//! assert_eq!(MAC_RANGE.len(), MAC_LENGTH);
//!
//! use std::time::Duration;
//! let timeout = Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS);
//! ```

use std::ops::Range;

// ============================================================================
// HCI Frame Layout
// ============================================================================

/// HCI packet indicator for controller events (first byte of the frame).
pub const HCI_EVENT_PACKET: u8 = 0x04;

/// Offset of the HCI packet indicator.
pub const PACKET_TYPE_OFFSET: usize = 0;

/// LE Meta sub-event code for an LE Advertising Report.
pub const LE_ADVERTISING_REPORT: u8 = 0x02;

/// Offset of the LE Meta sub-event code.
pub const SUBEVENT_OFFSET: usize = 3;

/// Length of a Bluetooth device address in bytes.
pub const MAC_LENGTH: usize = 6;

/// Byte range holding the advertiser address, in reverse wire order.
pub const MAC_RANGE: Range<usize> = 7..13;

/// Offset where the advertising data region begins.
pub const AD_DATA_OFFSET: usize = 14;

/// Number of trailing bytes excluded from the advertising data region.
pub const AD_DATA_TRAILER: usize = 2;

/// Shortest frame that carries a header, an empty region and the trailer.
pub const MIN_REPORT_FRAME_LENGTH: usize = AD_DATA_OFFSET + AD_DATA_TRAILER;

// ============================================================================
// Advertising Data Types
// ============================================================================

/// AD type: complete local name.
pub const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// AD type: manufacturer specific data.
pub const AD_TYPE_MANUFACTURER_SPECIFIC: u8 = 0xFF;

// ============================================================================
// ThermoBeacon Payload
// ============================================================================

/// Advertised local name of the supported beacon.
pub const TARGET_DEVICE_NAME: &str = "ThermoBeacon";

/// Exact length of a manufacturer value that carries sensor readings.
pub const SENSOR_PAYLOAD_LENGTH: usize = 19;

/// Value offset of the battery field.
pub const BATTERY_OFFSET: usize = 10;

/// Value offset of the temperature field (sixteenths of a degree Celsius).
pub const TEMPERATURE_OFFSET: usize = 12;

/// Value offset of the humidity field (sixteenths of a percent).
pub const HUMIDITY_OFFSET: usize = 14;

/// Fixed-point divisor for temperature and humidity.
pub const FIXED_POINT_DIVISOR: f64 = 16.0;

// ============================================================================
// Battery Curve
// ============================================================================

/// Battery thresholds in millivolts mapped to the reported percentage,
/// highest first. Anything below the last threshold reports 0%.
pub const BATTERY_CURVE: [(u16, u8); 5] =
    [(3000, 100), (2800, 80), (2600, 60), (2500, 40), (2450, 20)];

// ============================================================================
// Defaults
// ============================================================================

/// Default HCI interface index (`hci0`).
pub const DEFAULT_HCI_INTERFACE: u16 = 0;

/// Default reconciliation period in seconds.
pub const DEFAULT_PERIOD_SECS: u64 = 60;

/// Default bound on waiting for the capture loop to stop, in seconds.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

/// Default number of decimals for displayed readings.
pub const DEFAULT_DECIMALS: u8 = 2;

/// Largest accepted `decimals` setting.
pub const MAX_DECIMALS: u8 = 6;
