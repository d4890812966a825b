//! Decent Scale notifications.
//!
//! Firmware 1.0 sends 7-byte frames, 1.1 and later send 10-byte frames with the same
//! leading layout. The checksum covers bytes 0..6 and sits in the last byte.

use crate::protocol::{calculate_xor_checksum, hex_to_bytes, round_to};
use crate::scales::traits::IntoReading;
use crate::types::{ButtonEvent, ChecksumStatus, ScaleReading};
use log::{debug, warn};

pub const MIN_FRAME_LEN: usize = 7;
pub const EXTENDED_FRAME_LEN: usize = 10;

const CMD_WEIGHT_STABLE: u8 = 0xCE;
const CMD_WEIGHT_CHANGING: u8 = 0xCA;
const CMD_BUTTON: u8 = 0xAA;

const CHECKSUM_SPAN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1_0,
    V1_1,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecentMessage {
    Weight { weight_g: f32, is_stable: bool },
    Button(ButtonEvent),
    Other { command: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecentFrame {
    pub header: u8,
    pub api_version: ApiVersion,
    pub message: DecentMessage,
    pub checksum: ChecksumStatus,
}

pub fn parse_bytes(data: &[u8]) -> Option<DecentFrame> {
    if data.len() < MIN_FRAME_LEN {
        debug!("Decent frame too short: {} bytes", data.len());
        return None;
    }

    let api_version = if data.len() == EXTENDED_FRAME_LEN {
        ApiVersion::V1_1
    } else {
        ApiVersion::V1_0
    };

    let checksum = ChecksumStatus::from_match(
        calculate_xor_checksum(&data[..CHECKSUM_SPAN]) == data[data.len() - 1],
    );
    if checksum == ChecksumStatus::Invalid {
        warn!("Decent checksum mismatch: {:02X?}", data);
    }

    let command = data[1];
    let message = match command {
        CMD_WEIGHT_STABLE | CMD_WEIGHT_CHANGING => {
            let raw = i16::from_be_bytes([data[2], data[3]]);
            DecentMessage::Weight {
                weight_g: round_to(raw as f32 / 10.0, 1),
                is_stable: command == CMD_WEIGHT_STABLE,
            }
        }
        CMD_BUTTON => match data[2] {
            1 => DecentMessage::Button(ButtonEvent::Tare),
            2 => DecentMessage::Button(ButtonEvent::Timer),
            _ => DecentMessage::Button(ButtonEvent::Unknown),
        },
        other => DecentMessage::Other { command: other },
    };

    Some(DecentFrame {
        header: data[0],
        api_version,
        message,
        checksum,
    })
}

pub fn decode(payload_hex: &str) -> Option<DecentFrame> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl IntoReading for DecentFrame {
    fn to_reading(&self) -> ScaleReading {
        let mut reading = ScaleReading {
            checksum: self.checksum,
            ..Default::default()
        };
        match self.message {
            DecentMessage::Weight { weight_g, .. } => reading.weight = Some(weight_g),
            DecentMessage::Button(button) => reading.button = Some(button),
            DecentMessage::Other { .. } => {}
        }
        reading
    }
}
