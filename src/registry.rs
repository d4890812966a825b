//! Static table of supported devices, keyed by exact advertised name.

use crate::scales::ScaleProtocol;
use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no protocol registered for device {0:?}")]
    UnknownDevice(String),
}

/// GATT layout needed to talk to one device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub protocol: ScaleProtocol,
    pub service_uuid: Uuid,
    pub data_characteristic_uuid: Uuid,
    pub command_characteristic_uuid: Option<Uuid>,
}

/// 16-bit SIG-style UUID expanded onto the Bluetooth base UUID.
const fn short_uuid(short: u16) -> Uuid {
    Uuid::from_u128(((short as u128) << 96) | 0x0000_0000_0000_1000_8000_00805F9B34FB)
}

const ACAIA_SERVICE: Uuid = Uuid::from_u128(0x49535343_FE7D_4AE5_8FA9_9FAFD205E455);
const ACAIA_NOTIFY: Uuid = Uuid::from_u128(0x49535343_1E4D_4BD9_BA61_23C647249616);
const ACAIA_WRITE: Uuid = Uuid::from_u128(0x49535343_8841_43F4_A8D4_ECBE34729BB3);

const fn acaia(name: &'static str) -> DeviceProfile {
    DeviceProfile {
        name,
        protocol: ScaleProtocol::Acaia,
        service_uuid: ACAIA_SERVICE,
        data_characteristic_uuid: ACAIA_NOTIFY,
        command_characteristic_uuid: Some(ACAIA_WRITE),
    }
}

pub static DEVICES: &[DeviceProfile] = &[
    DeviceProfile {
        name: "BOOKOO_SC",
        protocol: ScaleProtocol::Bookoo,
        service_uuid: short_uuid(0x0FFE),
        data_characteristic_uuid: short_uuid(0xFF11),
        command_characteristic_uuid: Some(short_uuid(0xFF12)),
    },
    DeviceProfile {
        name: "Timemore Scale",
        protocol: ScaleProtocol::Timemore,
        service_uuid: short_uuid(0x181D),
        data_characteristic_uuid: short_uuid(0x2A9D),
        command_characteristic_uuid: None,
    },
    DeviceProfile {
        name: "BLACKCOFFEE",
        protocol: ScaleProtocol::Blackcoffee,
        service_uuid: short_uuid(0xFFB0),
        data_characteristic_uuid: short_uuid(0xFFB2),
        command_characteristic_uuid: None,
    },
    DeviceProfile {
        name: "Decent Scale",
        protocol: ScaleProtocol::Decent,
        service_uuid: short_uuid(0xFFF0),
        data_characteristic_uuid: short_uuid(0xFFF4),
        command_characteristic_uuid: Some(short_uuid(0x36F5)),
    },
    DeviceProfile {
        name: "CFS-9002",
        protocol: ScaleProtocol::Eureka,
        service_uuid: short_uuid(0xFFF0),
        data_characteristic_uuid: short_uuid(0xFFF1),
        command_characteristic_uuid: Some(short_uuid(0xFFF2)),
    },
    DeviceProfile {
        name: "FELICITA",
        protocol: ScaleProtocol::Felicita,
        service_uuid: short_uuid(0xFFE0),
        data_characteristic_uuid: short_uuid(0xFFE1),
        command_characteristic_uuid: None,
    },
    acaia("ACAIA"),
    acaia("LUNAR"),
    acaia("PEARLS"),
    acaia("PYXIS"),
    acaia("PROCHBT001"),
];

/// Resolve the protocol profile for an advertised device name.
///
/// Names are matched exactly; an unknown name is an error so callers never connect
/// without a protocol.
pub fn lookup(name: &str) -> Result<&'static DeviceProfile, RegistryError> {
    match DEVICES.iter().find(|profile| profile.name == name) {
        Some(profile) => {
            debug!("Resolved {:?} to {} protocol", name, profile.protocol.as_str());
            Ok(profile)
        }
        None => {
            warn!("Unknown scale device name: {:?}", name);
            Err(RegistryError::UnknownDevice(name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_devices() {
        let bookoo = lookup("BOOKOO_SC").unwrap();
        assert_eq!(bookoo.protocol, ScaleProtocol::Bookoo);
        assert_eq!(
            bookoo.data_characteristic_uuid.to_string(),
            "0000ff11-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            bookoo.command_characteristic_uuid.map(|u| u.to_string()),
            Some("0000ff12-0000-1000-8000-00805f9b34fb".to_string())
        );

        assert_eq!(lookup("FELICITA").unwrap().protocol, ScaleProtocol::Felicita);
        assert_eq!(lookup("PYXIS").unwrap().protocol, ScaleProtocol::Acaia);
        assert!(lookup("Timemore Scale")
            .unwrap()
            .command_characteristic_uuid
            .is_none());
    }

    #[test]
    fn test_names_are_exact() {
        assert_eq!(
            lookup("BOOKOO_SC_001"),
            Err(RegistryError::UnknownDevice("BOOKOO_SC_001".to_string()))
        );
        assert!(lookup("felicita").is_err());
        assert!(lookup("").is_err());
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in DEVICES.iter().enumerate() {
            for b in &DEVICES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
