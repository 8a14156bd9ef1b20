//! ThermoBeacon sensor payload decoding.
//!
//! The beacon broadcasts two kinds of advertisements: one carrying its
//! complete local name (`ThermoBeacon`) and one carrying a manufacturer
//! specific element with the measurements. The measurement value is exactly
//! 19 bytes with three little-endian `u16` fields at offset 10:
//!
//! | Value offset | Field | Scale |
//! |--------------|-------|-------|
//! | 10 | battery | millivolts |
//! | 12 | temperature | 1/16 °C |
//! | 14 | humidity | 1/16 % |

use crate::report::AdvertisingReport;
use serde::Serialize;
use thermoplus_core::{
    MacAddress,
    constants::{
        AD_TYPE_COMPLETE_LOCAL_NAME, AD_TYPE_MANUFACTURER_SPECIFIC, BATTERY_OFFSET,
        FIXED_POINT_DIVISOR, HUMIDITY_OFFSET, SENSOR_PAYLOAD_LENGTH, TARGET_DEVICE_NAME,
        TEMPERATURE_OFFSET,
    },
};

/// Measurements decoded from one ThermoBeacon advertisement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    /// Advertiser address.
    pub mac: MacAddress,

    /// Received signal strength in dBm.
    pub rssi: i8,

    /// Battery voltage in millivolts, as reported.
    pub battery_raw: u16,

    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative humidity in percent.
    pub humidity: f64,
}

impl SensorReading {
    /// Copy with temperature and humidity rounded to `decimals` places.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermoplus_hci::SensorReading;
    /// use thermoplus_core::MacAddress;
    ///
    /// let reading = SensorReading {
    ///     mac: MacAddress::new([0x06, 0x88, 0x00, 0x00, 0x16, 0x27]),
    ///     rssi: -56,
    ///     battery_raw: 3132,
    ///     temperature: 24.9375,
    ///     humidity: 58.0625,
    /// };
    ///
    /// let shown = reading.rounded(2);
    /// assert_eq!(shown.temperature, 24.94);
    /// assert_eq!(shown.humidity, 58.06);
    /// ```
    #[must_use]
    pub fn rounded(&self, decimals: u8) -> Self {
        Self {
            temperature: round_to(self.temperature, decimals),
            humidity: round_to(self.humidity, decimals),
            ..self.clone()
        }
    }
}

/// Extract sensor measurements from a report.
///
/// Uses the first manufacturer specific element whose value is exactly
/// 19 bytes; any other length is ignored rather than partially decoded.
#[must_use]
pub fn decode_sensor(report: &AdvertisingReport) -> Option<SensorReading> {
    let value = report
        .elements
        .iter()
        .find(|e| {
            e.ad_type == AD_TYPE_MANUFACTURER_SPECIFIC && e.value.len() == SENSOR_PAYLOAD_LENGTH
        })
        .map(|e| e.value.as_slice())?;

    let battery_raw = read_u16_le(value, BATTERY_OFFSET);
    let temperature = f64::from(read_u16_le(value, TEMPERATURE_OFFSET)) / FIXED_POINT_DIVISOR;
    let humidity = f64::from(read_u16_le(value, HUMIDITY_OFFSET)) / FIXED_POINT_DIVISOR;

    Some(SensorReading {
        mac: report.mac,
        rssi: report.rssi,
        battery_raw,
        temperature,
        humidity,
    })
}

/// Whether the report advertises the ThermoBeacon local name.
///
/// A name element that is not valid UTF-8 simply does not match.
#[must_use]
pub fn is_target_device(report: &AdvertisingReport) -> bool {
    report.elements.iter().any(|e| {
        e.ad_type == AD_TYPE_COMPLETE_LOCAL_NAME
            && std::str::from_utf8(&e.value).is_ok_and(|name| name == TARGET_DEVICE_NAME)
    })
}

/// Read a little-endian u16; callers guarantee `offset + 2 <= value.len()`.
fn read_u16_le(value: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([value[offset], value[offset + 1]])
}

fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}
