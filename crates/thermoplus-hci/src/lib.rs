//! HCI LE Advertising Report decoding for ThermoBeacon sensors.
//!
//! Decoding happens in two pure steps:
//!
//! 1. [`decode_report`] turns a captured [`RawFrame`] into an
//!    [`AdvertisingReport`] (address, RSSI, advertising data elements).
//! 2. [`decode_sensor`] extracts a [`SensorReading`] from the report's
//!    manufacturer-specific element, and [`is_target_device`] checks the
//!    advertised name.
//!
//! ```
//! use thermoplus_hci::{RawFrame, decode_report, decode_sensor};
//!
//! let frame = RawFrame::from_hex(
//!     "043e29020100002716000088061d0201060302f0ff15ff110000002716000088063c0c8f01a103b9d70300c8",
//! ).unwrap();
//!
//! let report = decode_report(&frame).unwrap();
//! assert_eq!(report.mac.to_string(), "06:88:00:00:16:27");
//!
//! let reading = decode_sensor(&report).unwrap();
//! assert_eq!(reading.battery_raw, 3132);
//! ```

pub mod frame;
pub mod report;
pub mod sensor;

pub use frame::RawFrame;
pub use report::{AdElement, AdvertisingReport, decode_report, parse_report};
pub use sensor::{SensorReading, decode_sensor, is_target_device};
