//! Acaia scale family notifications (Lunar, Pearl, Pyxis and friends).
//!
//! A notification may start mid-stream, so the frame is located by scanning for the
//! `EF DD` magic. Byte `s+2` is the message type; event messages (12) carry a sub-type
//! at `s+4` with the event payload starting at `s+5`, settings messages (8) carry their
//! payload from `s+3`.

use crate::protocol::hex_to_bytes;
use crate::scales::traits::IntoReading;
use crate::types::{ButtonEvent, ChecksumStatus, ScaleReading, WeightUnit};
use log::debug;

pub const MAGIC: [u8; 2] = [0xEF, 0xDD];

const MSG_SETTINGS: u8 = 8;
const MSG_EVENT: u8 = 12;

const EVENT_WEIGHT: u8 = 5;
const EVENT_TIMER: u8 = 7;
const EVENT_BUTTON: u8 = 8;
const EVENT_HEARTBEAT: u8 = 11;

const HEARTBEAT_TAG_WEIGHT: u8 = 5;
const HEARTBEAT_TAG_TIME: u8 = 7;

const SETTINGS_UNIT_GRAMS: u8 = 2;
const SETTINGS_UNIT_OUNCES: u8 = 5;

const WEIGHT_FIELD_LEN: usize = 6;
const TIME_FIELD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum AcaiaMessage {
    Weight {
        weight: f32,
    },
    Timer {
        milliseconds: u32,
    },
    Button {
        event: ButtonEvent,
        weight: Option<f32>,
        milliseconds: Option<u32>,
    },
    Heartbeat {
        weight: Option<f32>,
        milliseconds: Option<u32>,
    },
    Settings {
        battery_percent: u8,
        unit: Option<WeightUnit>,
        auto_off_minutes: u16,
        beep_on: bool,
    },
}

/// Offset of the first `EF DD` pair.
pub fn find_magic(data: &[u8]) -> Option<usize> {
    data.windows(MAGIC.len()).position(|pair| pair == MAGIC)
}

/// 16-bit little-endian magnitude at `[0..2]`, unit scale at `[4]`, sign flag at `[5]`.
pub fn decode_weight(payload: &[u8]) -> Option<f32> {
    if payload.len() < WEIGHT_FIELD_LEN {
        return None;
    }

    let raw = u16::from_le_bytes([payload[0], payload[1]]) as f32;
    let value = match payload[4] {
        1 => raw / 10.0,
        2 => raw / 100.0,
        3 => raw / 1000.0,
        4 => raw / 10000.0,
        unit => {
            debug!("Acaia weight unit out of range: {}", unit);
            return None;
        }
    };

    if payload[5] & 0x02 == 0x02 {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Minutes, seconds and deciseconds, returned in milliseconds.
pub fn decode_time(payload: &[u8]) -> Option<u32> {
    if payload.len() < TIME_FIELD_LEN {
        return None;
    }

    let seconds =
        payload[0] as f64 * 60.0 + payload[1] as f64 + payload[2] as f64 / 10.0;
    Some((seconds * 1000.0).round() as u32)
}

fn decode_button(payload: &[u8]) -> Option<AcaiaMessage> {
    if payload.len() < 2 {
        return None;
    }

    let tail = |from: usize| payload.get(from..).unwrap_or(&[]);
    let message = match (payload[0], payload[1]) {
        (0, 5) => AcaiaMessage::Button {
            event: ButtonEvent::Tare,
            weight: decode_weight(tail(2)),
            milliseconds: None,
        },
        (8, 5) => AcaiaMessage::Button {
            event: ButtonEvent::Start,
            weight: decode_weight(tail(2)),
            milliseconds: None,
        },
        (10, 7) | (10, 5) => AcaiaMessage::Button {
            event: ButtonEvent::Stop,
            weight: decode_weight(tail(6)),
            milliseconds: decode_time(tail(2)),
        },
        (9, 7) => AcaiaMessage::Button {
            event: ButtonEvent::Reset,
            weight: decode_weight(tail(6)),
            milliseconds: decode_time(tail(2)),
        },
        _ => AcaiaMessage::Button {
            event: ButtonEvent::Unknown,
            weight: None,
            milliseconds: None,
        },
    };
    Some(message)
}

fn decode_heartbeat(payload: &[u8]) -> Option<AcaiaMessage> {
    let tag = *payload.get(2)?;
    let body = payload.get(3..).unwrap_or(&[]);
    match tag {
        HEARTBEAT_TAG_WEIGHT => Some(AcaiaMessage::Heartbeat {
            weight: Some(decode_weight(body)?),
            milliseconds: None,
        }),
        HEARTBEAT_TAG_TIME => Some(AcaiaMessage::Heartbeat {
            weight: None,
            milliseconds: Some(decode_time(body)?),
        }),
        other => {
            debug!("Acaia heartbeat with unhandled tag {}", other);
            None
        }
    }
}

fn decode_event(sub_type: u8, payload: &[u8]) -> Option<AcaiaMessage> {
    match sub_type {
        EVENT_WEIGHT => Some(AcaiaMessage::Weight {
            weight: decode_weight(payload)?,
        }),
        EVENT_TIMER => Some(AcaiaMessage::Timer {
            milliseconds: decode_time(payload)?,
        }),
        EVENT_BUTTON => decode_button(payload),
        EVENT_HEARTBEAT => decode_heartbeat(payload),
        other => {
            debug!("Acaia event sub-type {} ignored", other);
            None
        }
    }
}

fn decode_settings(payload: &[u8]) -> Option<AcaiaMessage> {
    if payload.len() < 7 {
        return None;
    }

    let unit = match payload[2] {
        SETTINGS_UNIT_GRAMS => Some(WeightUnit::Grams),
        SETTINGS_UNIT_OUNCES => Some(WeightUnit::Ounces),
        _ => None,
    };

    Some(AcaiaMessage::Settings {
        battery_percent: payload[1] & 0x7F,
        unit,
        auto_off_minutes: payload[4] as u16 * 5,
        beep_on: payload[6] == 1,
    })
}

pub fn parse_bytes(data: &[u8]) -> Option<AcaiaMessage> {
    let start = find_magic(data)?;
    let message_type = *data.get(start + 2)?;

    match message_type {
        MSG_EVENT => {
            let sub_type = *data.get(start + 4)?;
            decode_event(sub_type, data.get(start + 5..).unwrap_or(&[]))
        }
        MSG_SETTINGS => decode_settings(data.get(start + 3..).unwrap_or(&[])),
        other => {
            debug!("Acaia message type {} ignored", other);
            None
        }
    }
}

pub fn decode(payload_hex: &str) -> Option<AcaiaMessage> {
    parse_bytes(&hex_to_bytes(payload_hex)?)
}

impl IntoReading for AcaiaMessage {
    fn to_reading(&self) -> ScaleReading {
        let mut reading = ScaleReading {
            checksum: ChecksumStatus::Unverifiable,
            ..Default::default()
        };
        match *self {
            AcaiaMessage::Weight { weight } => reading.weight = Some(weight),
            AcaiaMessage::Timer { milliseconds } => reading.milliseconds = Some(milliseconds),
            AcaiaMessage::Button {
                event,
                weight,
                milliseconds,
            } => {
                reading.button = Some(event);
                reading.weight = weight;
                reading.milliseconds = milliseconds;
            }
            AcaiaMessage::Heartbeat {
                weight,
                milliseconds,
            } => {
                reading.weight = weight;
                reading.milliseconds = milliseconds;
            }
            AcaiaMessage::Settings {
                battery_percent,
                unit,
                ..
            } => {
                reading.battery_percent = Some(battery_percent);
                reading.unit = unit;
            }
        }
        reading
    }
}
