//! Felicita scale notifications.
//!
//! Fixed 18-byte frames with the weight sent as ASCII decimal digits in hundredths of
//! a gram, an ASCII unit label and a raw battery voltage reading.

use crate::protocol::{hex_to_bytes, round_to};
use crate::scales::traits::IntoReading;
use crate::types::{ChecksumStatus, ScaleReading, WeightUnit};
use log::debug;

pub const FRAME_LEN: usize = 18;

const SIGN_NEGATIVE: u8 = b'-';
const BATTERY_RAW_EMPTY: f32 = 170.0;
const BATTERY_RAW_FULL: f32 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FelicitaFrame {
    pub weight: f32,
    pub unit_label: String,
    pub unit: WeightUnit,
    pub battery_percent: u8,
}

fn battery_from_raw(raw: u8) -> u8 {
    let fraction = (raw as f32 - BATTERY_RAW_EMPTY) / (BATTERY_RAW_FULL - BATTERY_RAW_EMPTY);
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

fn unit_from_label(label: &str) -> WeightUnit {
    match label.trim().to_ascii_lowercase().as_str() {
        "oz" => WeightUnit::Ounces,
        "ml" => WeightUnit::Milliliters,
        _ => WeightUnit::Grams,
    }
}

pub fn parse_bytes(data: &[u8]) -> Option<FelicitaFrame> {
    if data.len() != FRAME_LEN {
        debug!("Felicita frame has wrong length: {} bytes", data.len());
        return None;
    }

    let mut hundredths: u32 = 0;
    for &byte in &data[3..9] {
        if !byte.is_ascii_digit() {
            debug!("Felicita weight digit out of range: {:#04X}", byte);
            return None;
        }
        hundredths = hundredths * 10 + (byte - b'0') as u32;
    }
    let magnitude = round_to(hundredths as f32 / 100.0, 2);

    let unit_label: String = data[9..11].iter().map(|&b| b as char).collect();

    Some(FelicitaFrame {
        weight: if data[2] == SIGN_NEGATIVE { -magnitude } else { magnitude },
        unit: unit_from_label(&unit_label),
        unit_label,
        battery_percent: battery_from_raw(data[15]),
    })
}

pub fn decode(payload_hex: &str) -> Option<FelicitaFrame> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl IntoReading for FelicitaFrame {
    fn to_reading(&self) -> ScaleReading {
        ScaleReading {
            weight: Some(self.weight),
            unit: Some(self.unit),
            battery_percent: Some(self.battery_percent),
            checksum: ChecksumStatus::Unverifiable,
            ..Default::default()
        }
    }
}
