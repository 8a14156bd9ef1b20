use crate::{Result, constants::MAC_LENGTH, error::Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Bluetooth device address, stored in display order.
///
/// HCI frames carry the address least-significant byte first; use
/// [`MacAddress::from_wire`] to build one from frame bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; MAC_LENGTH]);

impl MacAddress {
    /// Create an address from bytes already in display order.
    #[must_use]
    pub const fn new(bytes: [u8; MAC_LENGTH]) -> Self {
        MacAddress(bytes)
    }

    /// Create an address from bytes in HCI wire order (reversed).
    ///
    /// # Errors
    /// Returns `Error::InvalidMacAddress` if `wire` is not exactly 6 bytes.
    pub fn from_wire(wire: &[u8]) -> Result<Self> {
        let mut bytes: [u8; MAC_LENGTH] = wire.try_into().map_err(|_| {
            Error::InvalidMacAddress(format!(
                "expected {MAC_LENGTH} address bytes, got {}",
                wire.len()
            ))
        })?;
        bytes.reverse();
        Ok(MacAddress(bytes))
    }

    /// Address bytes in display order.
    #[must_use]
    pub fn octets(&self) -> [u8; MAC_LENGTH] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl std::str::FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split([':', '-']).collect();
        if parts.len() != MAC_LENGTH {
            return Err(Error::InvalidMacAddress(s.to_string()));
        }

        let mut bytes = [0u8; MAC_LENGTH];
        for (slot, part) in bytes.iter_mut().zip(&parts) {
            // `from_str_radix` alone would accept a leading sign.
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::InvalidMacAddress(s.to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| Error::InvalidMacAddress(s.to_string()))?;
        }
        Ok(MacAddress(bytes))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
