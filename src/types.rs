use embassy_time::Instant;
use serde::{Deserialize, Serialize};

/// Timer state inferred from successive timer readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Reset,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Grams,
    Ounces,
    Milliliters,
}

/// Physical button presses reported by the scale itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonEvent {
    Tare,
    Start,
    Stop,
    Reset,
    /// Single start/stop/reset button on scales that do not say which action it was
    Timer,
    Unknown,
}

/// Outcome of frame checksum verification.
///
/// `Unverifiable` is reported by protocols that carry no checksum at all, so callers
/// can tell "passed" apart from "nothing to check".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumStatus {
    Valid,
    Invalid,
    #[default]
    Unverifiable,
}

impl ChecksumStatus {
    pub fn from_match(matches: bool) -> Self {
        if matches {
            ChecksumStatus::Valid
        } else {
            ChecksumStatus::Invalid
        }
    }

    pub fn is_valid(&self) -> Option<bool> {
        match self {
            ChecksumStatus::Valid => Some(true),
            ChecksumStatus::Invalid => Some(false),
            ChecksumStatus::Unverifiable => None,
        }
    }
}

/// Vendor-neutral view of one decoded frame. Every field is optional; a frame only
/// carries what its protocol put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleReading {
    /// Signed weight in the scale's display unit (grams unless `unit` says otherwise)
    pub weight: Option<f32>,
    pub flow_rate_g_per_s: Option<f32>,
    pub milliseconds: Option<u32>,
    pub battery_percent: Option<u8>,
    pub unit: Option<WeightUnit>,
    pub button: Option<ButtonEvent>,
    pub checksum: ChecksumStatus,
}

impl ScaleReading {
    /// True when the frame carried no measurement at all.
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.flow_rate_g_per_s.is_none()
            && self.milliseconds.is_none()
            && self.battery_percent.is_none()
            && self.unit.is_none()
            && self.button.is_none()
    }
}

/// Snapshot of the active connection's aggregated state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentReading {
    pub weight: Option<f32>,
    pub flow_rate_g_per_s: Option<f32>,
    pub battery_percent: Option<u8>,
    pub timer_millis: Option<u32>,
    pub timer_status: TimerStatus,
    pub unit: Option<WeightUnit>,
    pub last_button: Option<ButtonEvent>,
    #[serde(skip)]
    pub received_at: Option<Instant>,
}
