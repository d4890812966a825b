//! Shared vocabulary for all supported scale families.

use crate::types::ScaleReading;
use serde::{Deserialize, Serialize};

/// Commands a controller can request from a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleCommand {
    Tare,
    #[serde(rename = "start")]
    StartTimer,
    #[serde(rename = "stop")]
    StopTimer,
    #[serde(rename = "reset")]
    ResetTimer,
}

impl ScaleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleCommand::Tare => "tare",
            ScaleCommand::StartTimer => "start",
            ScaleCommand::StopTimer => "stop",
            ScaleCommand::ResetTimer => "reset",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "tare" => Some(ScaleCommand::Tare),
            "start" => Some(ScaleCommand::StartTimer),
            "stop" => Some(ScaleCommand::StopTimer),
            "reset" => Some(ScaleCommand::ResetTimer),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScaleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Scale capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleCapabilities {
    pub has_timer: bool,
    pub has_flow_rate: bool,
    pub has_battery_level: bool,
    pub supports_tare: bool,
    pub supports_timer_control: bool,
}

/// Conversion from a vendor-specific frame into the normalized reading.
pub trait IntoReading {
    fn to_reading(&self) -> ScaleReading;
}
