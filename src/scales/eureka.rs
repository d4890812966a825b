use crate::protocol::{hex_to_bytes, round_to};
use crate::scales::traits::IntoReading;
use crate::types::{ChecksumStatus, ScaleReading, WeightUnit};
use log::debug;

pub const MIN_FRAME_LEN: usize = 9;

const UNIT_OUNCES: u8 = 0x01;
const UNIT_MILLILITERS: u8 = 0x02;

/// Eureka Precisa notification. No checksum on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct EurekaFrame {
    pub weight: f32,
    pub unit: Option<WeightUnit>,
    pub battery_percent: Option<u8>,
}

fn unit_from_byte(byte: u8) -> WeightUnit {
    match byte {
        UNIT_OUNCES => WeightUnit::Ounces,
        UNIT_MILLILITERS => WeightUnit::Milliliters,
        _ => WeightUnit::Grams,
    }
}

pub fn parse_bytes(data: &[u8]) -> Option<EurekaFrame> {
    if data.len() < MIN_FRAME_LEN {
        debug!("Eureka frame too short: {} bytes", data.len());
        return None;
    }

    let negative = data[6] != 0;
    let raw = ((data[8] as u32) << 8) + data[7] as u32;
    let magnitude = raw as f32 / 10.0;

    Some(EurekaFrame {
        weight: round_to(if negative { -magnitude } else { magnitude }, 1),
        unit: data.get(9).map(|&b| unit_from_byte(b)),
        battery_percent: data.get(10).copied(),
    })
}

pub fn decode(payload_hex: &str) -> Option<EurekaFrame> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl IntoReading for EurekaFrame {
    fn to_reading(&self) -> ScaleReading {
        ScaleReading {
            weight: Some(self.weight),
            unit: self.unit,
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
    fn test_little_endian_weight() {
        // 0x016D = 365 -> 36.5
        let frame = decode("AA0209000000006D01").unwrap();
        assert!((frame.weight - 36.5).abs() < 1e-4);
        assert_eq!(frame.unit, None);
        assert_eq!(frame.battery_percent, None);
    }

    #[test]
    fn test_sign_unit_and_battery() {
        let frame = decode("AA0209000000016D010264").unwrap();
        assert!((frame.weight + 36.5).abs() < 1e-4);
        assert_eq!(frame.unit, Some(WeightUnit::Milliliters));
        assert_eq!(frame.battery_percent, Some(100));

        let frame = decode("AA0209000000006D0101").unwrap();
        assert_eq!(frame.unit, Some(WeightUnit::Ounces));
        let frame = decode("AA0209000000006D0100").unwrap();
        assert_eq!(frame.unit, Some(WeightUnit::Grams));
    }

    #[test]
    fn test_short_frame_is_empty() {
        assert!(decode("AA0209000000006D").is_none());
    }
}
