use crate::protocol::{hex_to_bytes, round_to};
use crate::scales::traits::IntoReading;
use crate::types::{ChecksumStatus, ScaleReading};
use log::debug;

pub const MIN_FRAME_LEN: usize = 8;

/// Timemore notification. The protocol has no checksum.
#[derive(Debug, Clone, PartialEq)]
pub struct TimemoreFrame {
    pub status: u8,
    pub weight_g: f32,
    pub second_weight_g: f32,
    pub battery_percent: Option<u8>,
}

fn be24_tenths(bytes: &[u8]) -> f32 {
    let raw = (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32;
    round_to(raw as f32 / 10.0, 1)
}

pub fn parse_bytes(data: &[u8]) -> Option<TimemoreFrame> {
    if data.len() < MIN_FRAME_LEN {
        debug!("Timemore frame too short: {} bytes", data.len());
        return None;
    }

    Some(TimemoreFrame {
        status: data[0],
        weight_g: be24_tenths(&data[1..4]),
        second_weight_g: be24_tenths(&data[5..8]),
        battery_percent: data.get(8).copied(),
    })
}

pub fn decode(payload_hex: &str) -> Option<TimemoreFrame> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl IntoReading for TimemoreFrame {
    fn to_reading(&self) -> ScaleReading {
        ScaleReading {
            weight: Some(self.weight_g),
            battery_percent: self.battery_percent,
            checksum: ChecksumStatus::Unverifiable,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_battery() {
        let frame = decode("01 00016D 00 000172 5A").unwrap();
        assert_eq!(frame.status, 0x01);
        assert!((frame.weight_g - 36.5).abs() < 1e-4);
        assert!((frame.second_weight_g - 37.0).abs() < 1e-4);
        assert_eq!(frame.battery_percent, Some(90));
    }

    #[test]
    fn test_decode_without_battery() {
        let frame = decode("0100016D00000172").unwrap();
        assert_eq!(frame.battery_percent, None);
        let reading = frame.to_reading();
        assert_eq!(reading.checksum, ChecksumStatus::Unverifiable);
        assert_eq!(reading.checksum.is_valid(), None);
    }

    #[test]
    fn test_short_frame_is_empty() {
        assert!(decode("0100016D000001").is_none());
    }
}
