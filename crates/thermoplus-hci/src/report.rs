//! LE Advertising Report parsing.
//!
//! Converts a [`RawFrame`] into an [`AdvertisingReport`]: the advertiser
//! address, the received signal strength and the advertising data elements.
//!
//! # Frame Layout
//!
//! ```text
//! 04 3E 29 02 01 00 00 | 27 16 00 00 88 06 | 1D | 02 01 06 03 02 F0 FF ... | .. | C8
//! ^pkt     ^sub        | address, reversed  |    | advertising data region  |    | RSSI
//! ```
//!
//! The advertising data region runs from offset 14 up to, but excluding, the
//! last two bytes of the frame. Each element inside it is
//! `length, type, value[length - 1]`.
//!
//! # Truncated Final Element
//!
//! Because the region stops two bytes before the end of the frame, the last
//! element of a real report usually claims one byte more than the region
//! holds. That element keeps the bytes that are present and ends parsing;
//! the ThermoBeacon manufacturer value arrives this way in practice.
//!
//! # Examples
//!
//! ```
//! use thermoplus_hci::{RawFrame, decode_report};
//!
//! // Not an HCI event packet: skipped, not an error.
//! let frame = RawFrame::from_hex("013e0002").unwrap();
//! assert!(decode_report(&frame).is_none());
//! ```

use crate::frame::RawFrame;
use serde::Serialize;
use thermoplus_core::{
    Error, MacAddress, Result,
    constants::{
        AD_DATA_OFFSET, AD_DATA_TRAILER, AD_TYPE_COMPLETE_LOCAL_NAME,
        AD_TYPE_MANUFACTURER_SPECIFIC, HCI_EVENT_PACKET, LE_ADVERTISING_REPORT, MAC_RANGE,
        MIN_REPORT_FRAME_LENGTH, PACKET_TYPE_OFFSET, SUBEVENT_OFFSET,
    },
};
use tracing::debug;

/// One advertising data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdElement {
    /// AD type tag (e.g. `0x09` complete local name).
    pub ad_type: u8,

    /// Length byte as declared on the wire (type byte included).
    pub length: i8,

    /// Element payload, bounded by the end of the advertising data region.
    pub value: Vec<u8>,
}

impl AdElement {
    /// Whether the region ended before the declared length was satisfied.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        usize::try_from(self.length).is_ok_and(|declared| self.value.len() + 1 < declared)
    }
}

/// A decoded LE Advertising Report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvertisingReport {
    /// Advertiser address.
    pub mac: MacAddress,

    /// Received signal strength in dBm.
    pub rssi: i8,

    /// Advertising data elements in wire order.
    pub elements: Vec<AdElement>,
}

impl AdvertisingReport {
    /// First element with the given AD type.
    #[must_use]
    pub fn element(&self, ad_type: u8) -> Option<&AdElement> {
        self.elements.iter().find(|e| e.ad_type == ad_type)
    }

    /// Advertised complete local name, if present and valid UTF-8.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.element(AD_TYPE_COMPLETE_LOCAL_NAME)
            .and_then(|e| std::str::from_utf8(&e.value).ok())
    }

    /// Values of all manufacturer specific elements.
    pub fn manufacturer_data(&self) -> impl Iterator<Item = &[u8]> {
        self.elements
            .iter()
            .filter(|e| e.ad_type == AD_TYPE_MANUFACTURER_SPECIFIC)
            .map(|e| e.value.as_slice())
    }
}

/// Decode a frame into an advertising report.
///
/// Frames that are not HCI LE Advertising Reports, or that are too short to
/// hold one, yield `None`. Malformed advertising data never fails the whole
/// frame; see [`parse_report`].
///
/// # Examples
///
/// ```
/// use thermoplus_hci::{RawFrame, decode_report};
///
/// let frame = RawFrame::from_hex(
///     "043e2302010400271600008806170d09546865726d6f426561636f6e051218003801020a00d9",
/// ).unwrap();
///
/// let report = decode_report(&frame).unwrap();
/// assert_eq!(report.mac.to_string(), "06:88:00:00:16:27");
/// assert_eq!(report.rssi, -39);
/// assert_eq!(report.local_name(), Some("ThermoBeacon"));
/// ```
#[must_use]
pub fn decode_report(frame: &RawFrame) -> Option<AdvertisingReport> {
    if !is_advertising_report(frame.as_bytes()) {
        return None;
    }

    match parse_report(frame) {
        Ok(report) => Some(report),
        Err(e) => {
            debug!("Skipping frame {}: {}", frame, e);
            None
        }
    }
}

/// Parse an advertising report, reporting why a frame was rejected.
///
/// # Errors
///
/// Returns `Error::InvalidFrame` if the frame is not an HCI LE Advertising
/// Report or is shorter than the fixed header plus trailer.
pub fn parse_report(frame: &RawFrame) -> Result<AdvertisingReport> {
    let bytes = frame.as_bytes();

    if !is_advertising_report(bytes) {
        return Err(Error::InvalidFrame(
            "not an HCI LE Advertising Report".to_string(),
        ));
    }
    if bytes.len() < MIN_REPORT_FRAME_LENGTH {
        return Err(Error::InvalidFrame(format!(
            "expected at least {MIN_REPORT_FRAME_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }

    let mac = MacAddress::from_wire(&bytes[MAC_RANGE])?;
    let rssi = bytes[bytes.len() - 1].cast_signed();
    let region = &bytes[AD_DATA_OFFSET..bytes.len() - AD_DATA_TRAILER];

    let elements = parse_elements(region).unwrap_or_else(|(partial, e)| {
        debug!("Advertising data from {} cut short: {}", mac, e);
        partial
    });

    Ok(AdvertisingReport {
        mac,
        rssi,
        elements,
    })
}

fn is_advertising_report(bytes: &[u8]) -> bool {
    bytes.get(PACKET_TYPE_OFFSET) == Some(&HCI_EVENT_PACKET)
        && bytes.get(SUBEVENT_OFFSET) == Some(&LE_ADVERTISING_REPORT)
}

/// Split the advertising data region into elements.
///
/// A zero length byte is padding and is stepped over. On a malformed
/// element the elements parsed so far are returned alongside the error, and
/// the rest of the region is skipped.
fn parse_elements(
    region: &[u8],
) -> std::result::Result<Vec<AdElement>, (Vec<AdElement>, Error)> {
    let mut elements = Vec::new();
    let mut offset = 0;

    while offset < region.len() {
        let length = region[offset].cast_signed();

        if length == 0 {
            // Zero-length padding: no tag, no value.
            offset += 1;
            continue;
        }
        if length < 0 {
            return Err((elements, Error::MalformedElement { offset, length }));
        }
        let Some(&ad_type) = region.get(offset + 1) else {
            return Err((elements, Error::MalformedElement { offset, length }));
        };

        let declared_end = offset + 1 + length as usize;
        let end = declared_end.min(region.len());

        elements.push(AdElement {
            ad_type,
            length,
            value: region[offset + 2..end].to_vec(),
        });
        offset = end;
    }

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Build a report frame around an advertising data region.
    fn frame_with_region(region: &[u8]) -> RawFrame {
        let mut bytes = vec![0x04, 0x3e, 0x00, 0x02, 0x01, 0x00, 0x00];
        bytes.extend_from_slice(&[0x27, 0x16, 0x00, 0x00, 0x88, 0x06]);
        bytes.push(region.len() as u8);
        bytes.extend_from_slice(region);
        bytes.extend_from_slice(&[0x00, 0xc8]);
        RawFrame::from(bytes)
    }

    #[rstest]
    #[case::not_event("013e0002010000271600008806000000")]
    #[case::wrong_subevent("043e0001010000271600008806000000")]
    #[case::empty("")]
    #[case::single_byte("04")]
    fn test_non_reports_skipped(#[case] hex_str: &str) {
        let frame = RawFrame::from_hex(hex_str).unwrap();
        assert!(decode_report(&frame).is_none());
    }

    #[test]
    fn test_short_report_rejected() {
        let frame = RawFrame::from_hex("043e0002010000271600008806").unwrap();
        assert!(decode_report(&frame).is_none());
        assert!(matches!(parse_report(&frame), Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_empty_region() {
        let report = decode_report(&frame_with_region(&[])).unwrap();
        assert_eq!(report.mac.to_string(), "06:88:00:00:16:27");
        assert_eq!(report.rssi, -56);
        assert!(report.elements.is_empty());
    }

    #[test]
    fn test_elements_consume_region() {
        let report = decode_report(&frame_with_region(&[
            0x02, 0x01, 0x06, // flags
            0x03, 0x02, 0xf0, 0xff, // 16-bit service UUIDs
        ]))
        .unwrap();

        assert_eq!(
            report.elements,
            vec![
                AdElement {
                    ad_type: 0x01,
                    length: 2,
                    value: vec![0x06],
                },
                AdElement {
                    ad_type: 0x02,
                    length: 3,
                    value: vec![0xf0, 0xff],
                },
            ]
        );
        assert!(report.elements.iter().all(|e| !e.is_truncated()));
    }

    #[test]
    fn test_final_element_clamped_to_region() {
        let report = decode_report(&frame_with_region(&[0x02, 0x01, 0x06, 0x05, 0xff, 0xaa]))
            .unwrap();

        assert_eq!(report.elements.len(), 2);
        let last = &report.elements[1];
        assert_eq!(last.ad_type, 0xff);
        assert_eq!(last.value, vec![0xaa]);
        assert!(last.is_truncated());
    }

    #[rstest]
    #[case::negative_length(&[0x02, 0x01, 0x06, 0xfe, 0x09, 0x41])]
    #[case::dangling_length(&[0x02, 0x01, 0x06, 0x04])]
    fn test_malformed_element_keeps_prefix(#[case] region: &[u8]) {
        let report = decode_report(&frame_with_region(region)).unwrap();
        assert_eq!(report.elements.len(), 1);
        assert_eq!(report.elements[0].ad_type, 0x01);
    }

    #[test]
    fn test_zero_length_padding_skipped() {
        let mut region = vec![0x02, 0x01, 0x06, 0x00, 0x0d, 0x09];
        region.extend_from_slice(b"ThermoBeacon");
        region.push(0x00);
        let report = decode_report(&frame_with_region(&region)).unwrap();

        let types: Vec<u8> = report.elements.iter().map(|e| e.ad_type).collect();
        assert_eq!(types, vec![0x01, 0x09]);
        assert_eq!(report.local_name(), Some("ThermoBeacon"));
    }

    #[test]
    fn test_length_one_has_empty_value() {
        let report = decode_report(&frame_with_region(&[0x01, 0x09, 0x02, 0x01, 0x06])).unwrap();
        assert_eq!(report.elements.len(), 2);
        assert!(report.elements[0].value.is_empty());
        assert_eq!(report.elements[1].value, vec![0x06]);
    }

    #[test]
    fn test_local_name_and_manufacturer_lookup() {
        let mut region = vec![0x05, 0x09];
        region.extend_from_slice(b"Test");
        region.extend_from_slice(&[0x03, 0xff, 0x11, 0x22]);
        let report = decode_report(&frame_with_region(&region)).unwrap();

        assert_eq!(report.local_name(), Some("Test"));
        let data: Vec<&[u8]> = report.manufacturer_data().collect();
        assert_eq!(data, vec![&[0x11, 0x22][..]]);
        assert!(report.element(0x01).is_none());
    }

    #[test]
    fn test_invalid_utf8_name() {
        let report = decode_report(&frame_with_region(&[0x03, 0x09, 0xff, 0xfe])).unwrap();
        assert!(report.local_name().is_none());
    }
}
