//! Per-vendor notification decoders.
//!
//! Every decoder is a total function over its input: short, garbled or unrecognised
//! payloads decode to `None` rather than an error.

pub mod acaia;
pub mod blackcoffee;
pub mod bookoo;
pub mod decent;
pub mod eureka;
pub mod felicita;
pub mod timemore;
pub mod traits;

pub use traits::*;

use crate::types::ScaleReading;
use serde::{Deserialize, Serialize};

/// Supported scale families. Each variant owns one wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleProtocol {
    Bookoo,
    Timemore,
    Blackcoffee,
    Decent,
    Eureka,
    Felicita,
    Acaia,
}

/// A decoded notification, keeping the vendor-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Bookoo(bookoo::BookooFrame),
    Timemore(timemore::TimemoreFrame),
    Blackcoffee(blackcoffee::BlackcoffeeFrame),
    Decent(decent::DecentFrame),
    Eureka(eureka::EurekaFrame),
    Felicita(felicita::FelicitaFrame),
    Acaia(acaia::AcaiaMessage),
}

impl DecodedFrame {
    pub fn protocol(&self) -> ScaleProtocol {
        match self {
            DecodedFrame::Bookoo(_) => ScaleProtocol::Bookoo,
            DecodedFrame::Timemore(_) => ScaleProtocol::Timemore,
            DecodedFrame::Blackcoffee(_) => ScaleProtocol::Blackcoffee,
            DecodedFrame::Decent(_) => ScaleProtocol::Decent,
            DecodedFrame::Eureka(_) => ScaleProtocol::Eureka,
            DecodedFrame::Felicita(_) => ScaleProtocol::Felicita,
            DecodedFrame::Acaia(_) => ScaleProtocol::Acaia,
        }
    }
}

impl IntoReading for DecodedFrame {
    fn to_reading(&self) -> ScaleReading {
        match self {
            DecodedFrame::Bookoo(frame) => frame.to_reading(),
            DecodedFrame::Timemore(frame) => frame.to_reading(),
            DecodedFrame::Blackcoffee(frame) => frame.to_reading(),
            DecodedFrame::Decent(frame) => frame.to_reading(),
            DecodedFrame::Eureka(frame) => frame.to_reading(),
            DecodedFrame::Felicita(frame) => frame.to_reading(),
            DecodedFrame::Acaia(message) => message.to_reading(),
        }
    }
}

impl ScaleProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleProtocol::Bookoo => "Bookoo",
            ScaleProtocol::Timemore => "Timemore",
            ScaleProtocol::Blackcoffee => "Blackcoffee",
            ScaleProtocol::Decent => "Decent",
            ScaleProtocol::Eureka => "Eureka",
            ScaleProtocol::Felicita => "Felicita",
            ScaleProtocol::Acaia => "Acaia",
        }
    }

    /// Decode one hex-encoded notification with this family's wire format.
    pub fn decode(&self, payload_hex: &str) -> Option<DecodedFrame> {
        match self {
            ScaleProtocol::Bookoo => bookoo::decode(payload_hex).map(DecodedFrame::Bookoo),
            ScaleProtocol::Timemore => timemore::decode(payload_hex).map(DecodedFrame::Timemore),
            ScaleProtocol::Blackcoffee => {
                blackcoffee::decode(payload_hex).map(DecodedFrame::Blackcoffee)
            }
            ScaleProtocol::Decent => decent::decode(payload_hex).map(DecodedFrame::Decent),
            ScaleProtocol::Eureka => eureka::decode(payload_hex).map(DecodedFrame::Eureka),
            ScaleProtocol::Felicita => felicita::decode(payload_hex).map(DecodedFrame::Felicita),
            ScaleProtocol::Acaia => acaia::decode(payload_hex).map(DecodedFrame::Acaia),
        }
    }

    pub fn capabilities(&self) -> ScaleCapabilities {
        match self {
            ScaleProtocol::Bookoo => ScaleCapabilities {
                has_timer: true,
                has_flow_rate: true,
                has_battery_level: true,
                supports_tare: true,
                supports_timer_control: true,
            },
            ScaleProtocol::Acaia => ScaleCapabilities {
                has_timer: true,
                has_flow_rate: false,
                has_battery_level: true,
                supports_tare: false,
                supports_timer_control: false,
            },
            ScaleProtocol::Timemore | ScaleProtocol::Eureka | ScaleProtocol::Felicita => {
                ScaleCapabilities {
                    has_timer: false,
                    has_flow_rate: false,
                    has_battery_level: true,
                    supports_tare: false,
                    supports_timer_control: false,
                }
            }
            ScaleProtocol::Blackcoffee | ScaleProtocol::Decent => ScaleCapabilities {
                has_timer: false,
                has_flow_rate: false,
                has_battery_level: false,
                supports_tare: false,
                supports_timer_control: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ScaleProtocol; 7] = [
        ScaleProtocol::Bookoo,
        ScaleProtocol::Timemore,
        ScaleProtocol::Blackcoffee,
        ScaleProtocol::Decent,
        ScaleProtocol::Eureka,
        ScaleProtocol::Felicita,
        ScaleProtocol::Acaia,
    ];

    #[test]
    fn test_short_frames_decode_to_nothing() {
        for protocol in ALL {
            assert!(protocol.decode("").is_none(), "{:?}", protocol);
            assert!(protocol.decode("0304").is_none(), "{:?}", protocol);
            assert!(protocol.decode("not hex").is_none(), "{:?}", protocol);
        }
    }

    #[test]
    fn test_dispatch_keeps_protocol() {
        let frame = ScaleProtocol::Acaia
            .decode("EFDD0C0C05420E00000200")
            .unwrap();
        assert_eq!(frame.protocol(), ScaleProtocol::Acaia);
        assert_eq!(frame.to_reading().weight, Some(36.5));

        let frame = ScaleProtocol::Eureka.decode("AA0209000000006D01").unwrap();
        assert_eq!(frame.protocol(), ScaleProtocol::Eureka);
    }

    #[test]
    fn test_only_bookoo_controls_timer() {
        let controllable: Vec<_> = ALL
            .iter()
            .filter(|p| p.capabilities().supports_timer_control)
            .collect();
        assert_eq!(controllable, vec![&ScaleProtocol::Bookoo]);
    }
}
