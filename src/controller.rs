use crate::{
    commands::{self, CommandBytes},
    registry::{self, DeviceProfile, RegistryError},
    scales::{IntoReading, ScaleCommand},
    state::SessionState,
    system::{EventBus, EventBusError, EventSubscriber, SessionConfig, SessionEvent, EVENT_HISTORY_LEN},
    types::CurrentReading,
};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use heapless::HistoryBuffer;
use log::{debug, info, warn};
use std::cell::RefCell;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no scale connected")]
    NotConnected,
    #[error("{device} does not accept the {command} command")]
    Unsupported {
        device: &'static str,
        command: ScaleCommand,
    },
}

/// Command bytes plus the characteristic the transport must write them to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub characteristic: Uuid,
    pub bytes: CommandBytes,
}

type EventHistory = HistoryBuffer<SessionEvent, EVENT_HISTORY_LEN>;

/// Entry point for the transport layer.
///
/// Holds the session of the currently connected scale. Notifications are decoded and
/// merged inside one critical section, so readers never see a half-applied frame.
pub struct ScaleController {
    config: SessionConfig,
    session: Mutex<CriticalSectionRawMutex, RefCell<Option<SessionState>>>,
    history: Mutex<CriticalSectionRawMutex, RefCell<EventHistory>>,
    events: EventBus,
}

impl Default for ScaleController {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ScaleController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: Mutex::new(RefCell::new(None)),
            history: Mutex::new(RefCell::new(HistoryBuffer::new())),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a session for `device_name`. Unknown names are rejected before anything
    /// else happens; an existing session is closed first.
    pub fn connect(&self, device_name: &str) -> Result<&'static DeviceProfile, RegistryError> {
        let profile = registry::lookup(device_name)?;

        let previous = self
            .session
            .lock(|cell| cell.borrow_mut().replace(SessionState::new(profile)));
        if let Some(previous) = previous {
            info!("Replacing session for {}", previous.device().name);
            self.emit(SessionEvent::Disconnected {
                device: previous.device().name,
            });
        }

        info!(
            "Connected to {} ({} protocol)",
            profile.name,
            profile.protocol.as_str()
        );
        self.emit(SessionEvent::Connected {
            device: profile.name,
            protocol: profile.protocol,
        });
        Ok(profile)
    }

    /// Drop the current session and everything it aggregated.
    pub fn disconnect(&self) {
        let previous = self.session.lock(|cell| cell.borrow_mut().take());
        match previous {
            Some(session) => {
                info!("Disconnected from {}", session.device().name);
                self.emit(SessionEvent::Disconnected {
                    device: session.device().name,
                });
            }
            None => debug!("Disconnect requested with no active session"),
        }
    }

    pub fn connected_device(&self) -> Option<&'static DeviceProfile> {
        self.session
            .lock(|cell| cell.borrow().as_ref().map(|session| session.device()))
    }

    /// Handle one characteristic notification.
    ///
    /// Returns whether the frame updated the current reading. Frames from other devices,
    /// undecodable frames and empty frames are dropped silently.
    pub fn on_notification(&self, device_name: &str, payload_hex: &str) -> bool {
        let config = &self.config;
        let outcome = self.session.lock(|cell| {
            let mut guard = cell.borrow_mut();
            let session = match guard.as_mut() {
                Some(session) if session.device().name == device_name => session,
                Some(session) => {
                    debug!(
                        "Ignoring notification from {:?}, connected to {}",
                        device_name,
                        session.device().name
                    );
                    return None;
                }
                None => {
                    debug!("Ignoring notification from {:?}, no session", device_name);
                    return None;
                }
            };

            let protocol = session.device().protocol;
            let Some(frame) = protocol.decode(payload_hex) else {
                debug!("Dropped undecodable {} frame: {}", protocol.as_str(), payload_hex);
                return None;
            };

            let reading = frame.to_reading();
            let updated = !reading.is_empty()
                && !(config.drop_failed_checksums && reading.checksum.is_valid() == Some(false));
            session.apply(&reading, config).map(|events| (updated, events))
        });

        match outcome {
            Some((updated, events)) => {
                for event in events {
                    self.emit(event);
                }
                updated
            }
            None => false,
        }
    }

    pub fn current_reading(&self) -> CurrentReading {
        self.session.lock(|cell| {
            cell.borrow()
                .as_ref()
                .map(SessionState::snapshot)
                .unwrap_or_default()
        })
    }

    /// Build the frame for `command` against the connected device. The caller writes
    /// it; no acknowledgement is tracked.
    pub fn send_command(&self, command: ScaleCommand) -> Result<CommandFrame, CommandError> {
        let profile = self.connected_device().ok_or(CommandError::NotConnected)?;

        let characteristic = match profile.command_characteristic_uuid {
            Some(uuid) if profile.protocol.capabilities().supports_timer_control => uuid,
            _ => {
                warn!("{} cannot take the {} command", profile.name, command.as_str());
                return Err(CommandError::Unsupported {
                    device: profile.name,
                    command,
                });
            }
        };

        let bytes = commands::encode(command);
        info!("Prepared {} command for {}: {:02X?}", command.as_str(), profile.name, bytes);
        Ok(CommandFrame {
            characteristic,
            bytes,
        })
    }

    pub fn subscribe(&self) -> Result<EventSubscriber<'_>, EventBusError> {
        self.events.subscriber()
    }

    /// Recent events, oldest first.
    pub fn recent_events(&self) -> Vec<SessionEvent> {
        self.history
            .lock(|cell| cell.borrow().oldest_ordered().cloned().collect())
    }

    fn emit(&self, event: SessionEvent) {
        if self.config.event_history {
            self.history.lock(|cell| cell.borrow_mut().write(event.clone()));
        }
        self.events.publish(event);
    }
}
