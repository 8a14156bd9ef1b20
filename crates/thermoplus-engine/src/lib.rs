//! Device registry and reconciliation for the Thermoplus BLE bridge.
//!
//! [`DeviceRegistry`] turns captured frames into per-device state and
//! [`RegistryEvent`] notifications. [`Processor`] drives it from a
//! [`Scanner`](thermoplus_scanner::Scanner) on a fixed period.

pub mod device;
pub mod processor;
pub mod registry;

pub use device::{Device, battery_level};
pub use processor::{CycleOutcome, Processor};
pub use registry::{DeviceRegistry, IngestSummary, RegistryEvent};
