//! Bookoo Themis timer-scale notifications.
//!
//! 20-byte frames carrying weight, flow rate, the onboard timer and battery level,
//! closed by an XOR checksum over the preceding 19 bytes.

use crate::protocol::{hex_to_bytes, round_to, verify_checksum};
use crate::scales::traits::IntoReading;
use crate::types::{ChecksumStatus, ScaleReading, WeightUnit};
use log::{debug, warn};

pub const FRAME_LEN: usize = 20;

const SIGN_POSITIVE: u8 = 0x2B; // '+'
const UNIT_GRAMS: u8 = 0x00;

#[derive(Debug, Clone, PartialEq)]
pub struct BookooFrame {
    pub product_number: u8,
    pub message_type: u8,
    pub milliseconds: u32,
    pub weight_unit: u8,
    pub weight_g: f32,
    pub flow_rate_g_per_s: f32,
    pub battery_percent: u8,
    pub standby_time_minutes: u16,
    pub buzzer_gear: u8,
    pub flow_rate_smoothing_enabled: bool,
    pub checksum: ChecksumStatus,
}

fn be24(bytes: &[u8]) -> u32 {
    (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32
}

fn signed(sign: u8, magnitude: f32) -> f32 {
    if sign == SIGN_POSITIVE {
        magnitude
    } else {
        -magnitude
    }
}

pub fn parse_bytes(data: &[u8]) -> Option<BookooFrame> {
    if data.len() < FRAME_LEN {
        debug!("Bookoo frame too short: {} bytes", data.len());
        return None;
    }

    let checksum = ChecksumStatus::from_match(verify_checksum(data));
    if checksum == ChecksumStatus::Invalid {
        warn!("Bookoo checksum mismatch: {:02X?}", data);
    }

    let weight_raw = be24(&data[7..10]) as f32 / 100.0;
    let flow_raw = u16::from_be_bytes([data[11], data[12]]) as f32 / 100.0;

    Some(BookooFrame {
        product_number: data[0],
        message_type: data[1],
        milliseconds: be24(&data[2..5]),
        weight_unit: data[5],
        weight_g: round_to(signed(data[6], weight_raw), 2),
        flow_rate_g_per_s: round_to(signed(data[10], flow_raw), 2),
        battery_percent: data[13],
        standby_time_minutes: u16::from_be_bytes([data[14], data[15]]),
        buzzer_gear: data[16],
        flow_rate_smoothing_enabled: data[17] == 1,
        checksum,
    })
}

pub fn decode(payload_hex: &str) -> Option<BookooFrame> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl BookooFrame {
    /// Only grams (`0x00`) is a known unit code; other values leave the unit unset.
    pub fn unit(&self) -> Option<WeightUnit> {
        match self.weight_unit {
            UNIT_GRAMS => Some(WeightUnit::Grams),
            _ => None,
        }
    }
}

impl IntoReading for BookooFrame {
    fn to_reading(&self) -> ScaleReading {
        ScaleReading {
            weight: Some(self.weight_g),
            flow_rate_g_per_s: Some(self.flow_rate_g_per_s),
            milliseconds: Some(self.milliseconds),
            battery_percent: Some(self.battery_percent),
            unit: self.unit(),
            checksum: self.checksum,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::calculate_xor_checksum;

    fn sample_frame() -> Vec<u8> {
        let mut frame = vec![
            0x03, 0x0B, // product, type
            0x00, 0x13, 0x88, // 5000 ms
            0x00, // unit
            0x2B, 0x00, 0x0E, 0x42, // +36.50 g
            0x2B, 0x00, 0x7B, // +1.23 g/s
            0x55, // 85 %
            0x00, 0x0F, // 15 min standby
            0x02, // buzzer
            0x01, // smoothing on
            0x00,
        ];
        let checksum = calculate_xor_checksum(&frame);
        frame.push(checksum);
        frame
    }

    #[test]
    fn test_decode_full_frame() {
        let frame = decode(&hex::encode(sample_frame())).unwrap();
        assert_eq!(frame.product_number, 0x03);
        assert_eq!(frame.message_type, 0x0B);
        assert_eq!(frame.milliseconds, 5000);
        assert!((frame.weight_g - 36.50).abs() < 1e-4);
        assert!((frame.flow_rate_g_per_s - 1.23).abs() < 1e-4);
        assert_eq!(frame.battery_percent, 85);
        assert_eq!(frame.standby_time_minutes, 15);
        assert_eq!(frame.buzzer_gear, 2);
        assert!(frame.flow_rate_smoothing_enabled);
        assert_eq!(frame.checksum, ChecksumStatus::Valid);
    }

    #[test]
    fn test_negative_sign_bytes() {
        let mut bytes = sample_frame();
        bytes[6] = 0x2D;
        bytes[10] = 0x2D;
        bytes[19] = calculate_xor_checksum(&bytes[..19]);
        let frame = parse_bytes(&bytes).unwrap();
        assert!((frame.weight_g + 36.50).abs() < 1e-4);
        assert!((frame.flow_rate_g_per_s + 1.23).abs() < 1e-4);
    }

    #[test]
    fn test_checksum_mismatch_still_surfaces_values() {
        let mut bytes = sample_frame();
        bytes[19] ^= 0xFF;
        let frame = parse_bytes(&bytes).unwrap();
        assert_eq!(frame.checksum, ChecksumStatus::Invalid);
        assert!((frame.weight_g - 36.50).abs() < 1e-4);
    }

    #[test]
    fn test_short_frame_is_empty() {
        let bytes = sample_frame();
        assert!(parse_bytes(&bytes[..19]).is_none());
        assert!(decode("").is_none());
        assert!(decode("zz").is_none());
    }

    #[test]
    fn test_reading_conversion() {
        let reading = parse_bytes(&sample_frame()).unwrap().to_reading();
        assert_eq!(reading.milliseconds, Some(5000));
        assert_eq!(reading.battery_percent, Some(85));
        assert_eq!(reading.unit, Some(WeightUnit::Grams));
        assert_eq!(reading.checksum.is_valid(), Some(true));
    }

    #[test]
    fn test_unknown_unit_code_leaves_unit_unset() {
        let mut bytes = sample_frame();
        bytes[5] = 0x01;
        bytes[19] = calculate_xor_checksum(&bytes[..19]);
        let frame = parse_bytes(&bytes).unwrap();
        assert_eq!(frame.weight_unit, 0x01);
        assert_eq!(frame.to_reading().unit, None);
    }
}
