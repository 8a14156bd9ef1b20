//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use thermoplus_core::Config;
//!
//! let config = Config::from_json_str("{}").unwrap();
//! assert_eq!(config.period_secs, 60);
//! assert_eq!(config.hci_interface, 0);
//!
//! let config = Config::from_json_str(r#"{"period_secs": 30, "hci_dump": true}"#).unwrap();
//! assert_eq!(config.period().as_secs(), 30);
//! assert!(config.hci_dump);
//! ```

use crate::{
    Result,
    constants::{
        DEFAULT_DECIMALS, DEFAULT_HCI_INTERFACE, DEFAULT_PERIOD_SECS, DEFAULT_STOP_TIMEOUT_SECS,
        MAX_DECIMALS,
    },
    error::Error,
    types::MacAddress,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scanner and reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HCI interface index (`0` for `hci0`).
    pub hci_interface: u16,

    /// Seconds between reconciliation cycles.
    pub period_secs: u64,

    /// Seconds to wait for the capture loop to acknowledge a stop.
    pub stop_timeout_secs: u64,

    /// Log every captured frame in hex at debug level.
    pub hci_dump: bool,

    /// Round temperature and humidity before publishing them.
    pub rounding: bool,

    /// Decimal places used when `rounding` is enabled.
    pub decimals: u8,

    /// When set, only these devices are tracked.
    pub whitelist: Option<Vec<MacAddress>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hci_interface: DEFAULT_HCI_INTERFACE,
            period_secs: DEFAULT_PERIOD_SECS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
            hci_dump: false,
            rounding: true,
            decimals: DEFAULT_DECIMALS,
            whitelist: None,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns `Error::Json` for malformed JSON or unknown keys and
    /// `Error::Config` when a value is out of range.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`Config::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.period_secs == 0 {
            return Err(Error::Config("period_secs must be positive".to_string()));
        }
        if self.stop_timeout_secs == 0 {
            return Err(Error::Config(
                "stop_timeout_secs must be positive".to_string(),
            ));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(Error::Config(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        Ok(())
    }

    /// Reconciliation period.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    /// Capture loop stop timeout.
    #[must_use]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Decimal places to publish, or `None` when rounding is disabled.
    #[must_use]
    pub fn display_decimals(&self) -> Option<u8> {
        self.rounding.then_some(self.decimals)
    }

    /// Whether `mac` passes the whitelist (always true without one).
    #[must_use]
    pub fn is_allowed(&self, mac: &MacAddress) -> bool {
        self.whitelist
            .as_ref()
            .is_none_or(|allowed| allowed.contains(mac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.hci_interface, 0);
        assert_eq!(config.period(), Duration::from_secs(60));
        assert_eq!(config.stop_timeout(), Duration::from_secs(10));
        assert!(!config.hci_dump);
        assert_eq!(config.display_decimals(), Some(2));
        assert!(config.whitelist.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{"hci_interface": 1, "rounding": false}"#).unwrap();
        assert_eq!(config.hci_interface, 1);
        assert_eq!(config.period_secs, DEFAULT_PERIOD_SECS);
        assert_eq!(config.display_decimals(), None);
    }

    #[rstest]
    #[case(r#"{"period_secs": 0}"#)]
    #[case(r#"{"stop_timeout_secs": 0}"#)]
    #[case(r#"{"decimals": 9}"#)]
    fn test_out_of_range(#[case] input: &str) {
        assert!(matches!(Config::from_json_str(input), Err(Error::Config(_))));
    }

    #[rstest]
    #[case(r#"{"period_secs": -5}"#)]
    #[case(r#"{"unknown": true}"#)]
    #[case("not json")]
    fn test_rejected_json(#[case] input: &str) {
        assert!(matches!(Config::from_json_str(input), Err(Error::Json(_))));
    }

    #[test]
    fn test_whitelist() {
        let config =
            Config::from_json_str(r#"{"whitelist": ["06:88:00:00:16:27"]}"#).unwrap();
        let listed: MacAddress = "06:88:00:00:16:27".parse().unwrap();
        let other: MacAddress = "11:22:33:44:55:66".parse().unwrap();

        assert!(config.is_allowed(&listed));
        assert!(!config.is_allowed(&other));
        assert!(Config::default().is_allowed(&other));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"period_secs": 15, "hci_dump": true}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.period_secs, 15);
        assert!(config.hci_dump);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/thermoplus.json"),
            Err(Error::Io(_))
        ));
    }
}
