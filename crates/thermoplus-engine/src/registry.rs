//! Device registry and batch reconciliation.
//!
//! The registry turns a batch of captured frames into device state. Frames
//! are processed strictly in arrival order:
//!
//! 1. Decode the advertising report; frames that are not reports are skipped.
//! 2. A report carrying the `ThermoBeacon` name registers its address.
//! 3. A report carrying a measurement registers its address if needed and
//!    replaces the device's last reading.
//!
//! Every registration emits [`RegistryEvent::DeviceDiscovered`] exactly once
//! per address; every measurement emits [`RegistryEvent::ReadingUpdated`].
//!
//! # Examples
//!
//! ```
//! use thermoplus_core::Config;
//! use thermoplus_engine::{DeviceRegistry, RegistryEvent};
//! use thermoplus_hci::RawFrame;
//!
//! let mut registry = DeviceRegistry::new(&Config::default());
//! let mut events = registry.subscribe();
//!
//! let frame = RawFrame::from_hex(
//!     "043e29020100002716000088061d0201060302f0ff15ff110000002716000088063c0c8f01a103b9d70300c8",
//! ).unwrap();
//! let summary = registry.ingest(vec![frame]);
//! assert_eq!(summary.updated, 1);
//!
//! assert!(matches!(events.try_recv(), Ok(RegistryEvent::DeviceDiscovered { .. })));
//! assert!(matches!(events.try_recv(), Ok(RegistryEvent::ReadingUpdated { .. })));
//! ```

use crate::device::Device;
use serde::Serialize;
use std::collections::{HashMap, HashSet, hash_map::Entry};
use thermoplus_core::{Config, MacAddress};
use thermoplus_hci::{RawFrame, SensorReading, decode_report, decode_sensor, is_target_device};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Notification sent to the entity layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A device was registered for the first time.
    DeviceDiscovered { mac: MacAddress },

    /// A device published a new measurement.
    ReadingUpdated {
        mac: MacAddress,
        battery_raw: u16,
        temperature: f64,
        humidity: f64,
        rssi: i8,
    },
}

/// Counters for one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Frames in the batch.
    pub frames: usize,

    /// Frames that decoded to an advertising report.
    pub reports: usize,

    /// Devices registered by this batch.
    pub discovered: usize,

    /// Measurements recorded by this batch.
    pub updated: usize,
}

/// In-memory map of tracked devices.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: HashMap<MacAddress, Device>,
    whitelist: Option<HashSet<MacAddress>>,
    decimals: Option<u8>,
    events: Option<mpsc::UnboundedSender<RegistryEvent>>,
}

impl DeviceRegistry {
    /// Create an empty registry using the whitelist and rounding settings
    /// from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            devices: HashMap::new(),
            whitelist: config
                .whitelist
                .as_ref()
                .map(|macs| macs.iter().copied().collect()),
            decimals: config.display_decimals(),
            events: None,
        }
    }

    /// Start receiving registry events.
    ///
    /// Replaces any previous subscriber. Until the first call, no events are
    /// queued.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RegistryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Apply a batch of frames in order.
    pub fn ingest(&mut self, frames: Vec<RawFrame>) -> IngestSummary {
        let mut summary = IngestSummary {
            frames: frames.len(),
            ..IngestSummary::default()
        };

        for frame in &frames {
            let Some(report) = decode_report(frame) else {
                continue;
            };
            summary.reports += 1;

            if !self.is_allowed(&report.mac) {
                debug!("Ignoring {}: not whitelisted", report.mac);
                continue;
            }

            if is_target_device(&report) && self.register(report.mac) {
                summary.discovered += 1;
            }

            if let Some(reading) = decode_sensor(&report) {
                if self.register(reading.mac) {
                    summary.discovered += 1;
                }
                self.update(reading);
                summary.updated += 1;
            }
        }

        summary
    }

    /// Tracked device by address.
    pub fn device(&self, mac: &MacAddress) -> Option<&Device> {
        self.devices.get(mac)
    }

    /// All tracked devices, in no particular order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Number of tracked devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is tracked.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn is_allowed(&self, mac: &MacAddress) -> bool {
        self.whitelist
            .as_ref()
            .is_none_or(|allowed| allowed.contains(mac))
    }

    /// Register `mac` if unseen; returns whether it was new.
    fn register(&mut self, mac: MacAddress) -> bool {
        match self.devices.entry(mac) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Device::new(mac));
                info!("Discovered ThermoBeacon {}", mac);
                self.emit(RegistryEvent::DeviceDiscovered { mac });
                true
            }
        }
    }

    fn update(&mut self, reading: SensorReading) {
        let shown = match self.decimals {
            Some(decimals) => reading.rounded(decimals),
            None => reading,
        };

        debug!(
            "{}: {}°C {}% battery {}mV rssi {}",
            shown.mac, shown.temperature, shown.humidity, shown.battery_raw, shown.rssi
        );

        let event = RegistryEvent::ReadingUpdated {
            mac: shown.mac,
            battery_raw: shown.battery_raw,
            temperature: shown.temperature,
            humidity: shown.humidity,
            rssi: shown.rssi,
        };

        if let Some(device) = self.devices.get_mut(&shown.mac) {
            device.record(shown);
        }
        self.emit(event);
    }

    fn emit(&mut self, event: RegistryEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        if tx.send(event).is_err() {
            debug!("Registry subscriber went away");
            self.events = None;
        }
    }
}
