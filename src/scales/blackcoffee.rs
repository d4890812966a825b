//! Blackcoffee scale notifications.
//!
//! The layout is defined over the hex text rather than bytes: single nibbles carry the
//! sign and stability flags and the magnitude is a 7-digit hex number in milligrams.

use crate::protocol::{normalize_hex, round_to};
use crate::scales::traits::IntoReading;
use crate::types::{ChecksumStatus, ScaleReading};
use log::debug;

pub const MIN_FRAME_LEN: usize = 14;

const SIGN_NIBBLE: usize = 4;
const STABILITY_NIBBLE: usize = 5;
const WEIGHT_DIGITS: std::ops::Range<usize> = 7..14;

#[derive(Debug, Clone, PartialEq)]
pub struct BlackcoffeeFrame {
    pub weight_g: f32,
    pub is_stable: bool,
}

pub fn decode(payload_hex: &str) -> Option<BlackcoffeeFrame> {
    let hex = normalize_hex(payload_hex)?;
    if hex.len() < MIN_FRAME_LEN * 2 {
        debug!("Blackcoffee frame too short: {} bytes", hex.len() / 2);
        return None;
    }

    let nibbles = hex.as_bytes();
    let negative = matches!(nibbles[SIGN_NIBBLE], b'8' | b'c');
    let is_stable = nibbles[STABILITY_NIBBLE] == b'1';

    let magnitude = u32::from_str_radix(&hex[WEIGHT_DIGITS], 16).ok()? as f32 / 1000.0;
    let weight_g = if negative { -magnitude } else { magnitude };

    Some(BlackcoffeeFrame {
        weight_g: round_to(weight_g, 2),
        is_stable,
    })
}

impl IntoReading for BlackcoffeeFrame {
    fn to_reading(&self) -> ScaleReading {
        ScaleReading {
            weight: Some(self.weight_g),
            checksum: ChecksumStatus::Unverifiable,
            ..Default::default()
        }
    }
}
