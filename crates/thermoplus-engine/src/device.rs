//! Tracked ThermoBeacon devices.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thermoplus_core::{MacAddress, constants::BATTERY_CURVE};
use thermoplus_hci::SensorReading;

/// A device the registry has accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    /// Advertiser address.
    pub mac: MacAddress,

    /// Most recent measurement, if any has been seen.
    pub last_reading: Option<SensorReading>,

    /// When the device was first accepted.
    pub first_seen: DateTime<Utc>,

    /// When `last_reading` was last replaced.
    pub last_updated: Option<DateTime<Utc>>,

    /// Number of readings recorded.
    pub update_count: u64,
}

impl Device {
    /// Create a device with no reading yet.
    pub fn new(mac: MacAddress) -> Self {
        Self {
            mac,
            last_reading: None,
            first_seen: Utc::now(),
            last_updated: None,
            update_count: 0,
        }
    }

    /// Stable identifier for entity registries (`t_<MAC>`).
    ///
    /// # Examples
    ///
    /// ```
    /// use thermoplus_engine::Device;
    ///
    /// let device = Device::new("06:88:00:00:16:27".parse().unwrap());
    /// assert_eq!(device.unique_id(), "t_06:88:00:00:16:27");
    /// assert_eq!(device.display_name(), "Thermoplus 06:88:00:00:16:27");
    /// ```
    pub fn unique_id(&self) -> String {
        format!("t_{}", self.mac)
    }

    /// Human-readable name (`Thermoplus <MAC>`).
    pub fn display_name(&self) -> String {
        format!("Thermoplus {}", self.mac)
    }

    /// Battery percentage from the last reading.
    pub fn battery_level(&self) -> Option<u8> {
        self.last_reading
            .as_ref()
            .map(|reading| battery_level(reading.battery_raw))
    }

    pub(crate) fn record(&mut self, reading: SensorReading) {
        self.last_reading = Some(reading);
        self.last_updated = Some(Utc::now());
        self.update_count += 1;
    }
}

/// Map battery millivolts to a coarse percentage.
///
/// # Examples
///
/// ```
/// use thermoplus_engine::battery_level;
///
/// assert_eq!(battery_level(3132), 100);
/// assert_eq!(battery_level(2650), 60);
/// assert_eq!(battery_level(2000), 0);
/// ```
pub fn battery_level(battery_raw: u16) -> u8 {
    BATTERY_CURVE
        .iter()
        .find(|(millivolts, _)| battery_raw >= *millivolts)
        .map_or(0, |(_, percent)| *percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mac() -> MacAddress {
        "06:88:00:00:16:27".parse().unwrap()
    }

    #[rstest]
    #[case(3300, 100)]
    #[case(3000, 100)]
    #[case(2999, 80)]
    #[case(2800, 80)]
    #[case(2600, 60)]
    #[case(2599, 40)]
    #[case(2500, 40)]
    #[case(2450, 20)]
    #[case(2449, 0)]
    #[case(0, 0)]
    fn test_battery_curve(#[case] millivolts: u16, #[case] expected: u8) {
        assert_eq!(battery_level(millivolts), expected);
    }

    #[test]
    fn test_new_device_has_no_reading() {
        let device = Device::new(mac());
        assert!(device.last_reading.is_none());
        assert!(device.last_updated.is_none());
        assert_eq!(device.update_count, 0);
        assert_eq!(device.battery_level(), None);
    }

    #[test]
    fn test_record_reading() {
        let mut device = Device::new(mac());
        device.record(SensorReading {
            mac: mac(),
            rssi: -56,
            battery_raw: 2850,
            temperature: 21.5,
            humidity: 40.0,
        });

        assert_eq!(device.update_count, 1);
        assert!(device.last_updated.is_some_and(|t| t >= device.first_seen));
        assert_eq!(device.battery_level(), Some(80));
    }
}
