use crate::protocol::round_to;
use crate::registry::DeviceProfile;
use crate::system::{SessionConfig, SessionEvent};
use crate::timer::TimerTracker;
use crate::types::{ChecksumStatus, CurrentReading, ScaleReading, TimerStatus};
use embassy_time::Instant;
use log::{debug, warn};

pub const MAX_EVENTS_PER_FRAME: usize = 4;

pub type FrameEvents = heapless::Vec<SessionEvent, MAX_EVENTS_PER_FRAME>;

/// Aggregated state of one active connection.
///
/// Owned by the controller and replaced on every connect, so nothing survives a
/// disconnect.
pub struct SessionState {
    device: &'static DeviceProfile,
    reading: CurrentReading,
    timer: TimerTracker,
}

impl SessionState {
    pub fn new(device: &'static DeviceProfile) -> Self {
        Self {
            device,
            reading: CurrentReading::default(),
            timer: TimerTracker::new(),
        }
    }

    pub fn device(&self) -> &'static DeviceProfile {
        self.device
    }

    /// Merge one decoded frame into the current reading.
    ///
    /// Fields absent from the frame keep their previous value. Returns the events the
    /// frame produced, or `None` when the frame was ignored.
    pub fn apply(&mut self, frame: &ScaleReading, config: &SessionConfig) -> Option<FrameEvents> {
        if frame.is_empty() {
            debug!("Ignoring empty frame from {}", self.device.name);
            return None;
        }

        let mut events = FrameEvents::new();

        if frame.checksum == ChecksumStatus::Invalid {
            let _ = events.push(SessionEvent::ChecksumFailed {
                device: self.device.name,
            });
            if config.drop_failed_checksums {
                warn!("Dropping frame with bad checksum from {}", self.device.name);
                return Some(events);
            }
        }

        if let Some(weight) = frame.weight {
            self.reading.weight = Some(round_to(weight, config.weight_decimals));
        }
        if let Some(flow_rate) = frame.flow_rate_g_per_s {
            self.reading.flow_rate_g_per_s = Some(flow_rate);
        }
        if let Some(battery) = frame.battery_percent {
            self.reading.battery_percent = Some(battery.min(100));
        }
        if let Some(unit) = frame.unit {
            self.reading.unit = Some(unit);
        }
        if let Some(button) = frame.button {
            self.reading.last_button = Some(button);
            let _ = events.push(SessionEvent::Button(button));
        }
        if let Some(millis) = frame.milliseconds {
            self.reading.timer_millis = Some(millis);
            if let Some((from, to)) = self.timer.update(millis) {
                let _ = events.push(SessionEvent::TimerChanged { from, to, millis });
            }
            self.reading.timer_status = self.timer.status();
        }
        self.reading.received_at = Some(Instant::now());

        debug!(
            "{}: weight={:?} flow={:?} battery={:?} timer={:?} ({:?})",
            self.device.name,
            self.reading.weight,
            self.reading.flow_rate_g_per_s,
            self.reading.battery_percent,
            self.reading.timer_millis,
            self.reading.timer_status
        );

        Some(events)
    }

    pub fn snapshot(&self) -> CurrentReading {
        self.reading.clone()
    }

    pub fn timer_status(&self) -> TimerStatus {
        self.timer.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::lookup;
    use crate::types::{ButtonEvent, WeightUnit};

    fn bookoo_session() -> SessionState {
        SessionState::new(lookup("BOOKOO_SC").unwrap())
    }

    fn timer_frame(millis: u32) -> ScaleReading {
        ScaleReading {
            weight: Some(10.0),
            milliseconds: Some(millis),
            checksum: ChecksumStatus::Valid,
            ..Default::default()
        }
    }

    #[test]
    fn test_fields_merge_sparsely() {
        let mut session = bookoo_session();
        let config = SessionConfig::default();

        session.apply(
            &ScaleReading {
                weight: Some(18.234),
                battery_percent: Some(80),
                ..Default::default()
            },
            &config,
        );
        session.apply(
            &ScaleReading {
                unit: Some(WeightUnit::Grams),
                flow_rate_g_per_s: Some(-0.5),
                ..Default::default()
            },
            &config,
        );

        let reading = session.snapshot();
        assert_eq!(reading.weight, Some(18.23));
        assert_eq!(reading.battery_percent, Some(80));
        assert_eq!(reading.flow_rate_g_per_s, Some(-0.5));
        assert_eq!(reading.unit, Some(WeightUnit::Grams));
        assert!(reading.received_at.is_some());
    }

    #[test]
    fn test_empty_frame_changes_nothing() {
        let mut session = bookoo_session();
        assert!(session
            .apply(&ScaleReading::default(), &SessionConfig::default())
            .is_none());
        assert_eq!(session.snapshot(), CurrentReading::default());
    }

    #[test]
    fn test_timer_transitions_become_events() {
        let mut session = bookoo_session();
        let config = SessionConfig::default();

        let events = session.apply(&timer_frame(0), &config).unwrap();
        assert!(events.is_empty());

        let events = session.apply(&timer_frame(500), &config).unwrap();
        assert_eq!(
            events.as_slice(),
            &[SessionEvent::TimerChanged {
                from: TimerStatus::Reset,
                to: TimerStatus::Running,
                millis: 500
            }]
        );

        session.apply(&timer_frame(1000), &config);
        session.apply(&timer_frame(1000), &config);
        assert_eq!(session.timer_status(), TimerStatus::Stopped);
        assert_eq!(session.snapshot().timer_millis, Some(1000));
    }

    #[test]
    fn test_bad_checksum_surfaces_or_drops() {
        let mut frame = timer_frame(500);
        frame.checksum = ChecksumStatus::Invalid;

        let mut session = bookoo_session();
        let events = session.apply(&frame, &SessionConfig::default()).unwrap();
        assert_eq!(
            events[0],
            SessionEvent::ChecksumFailed { device: "BOOKOO_SC" }
        );
        assert_eq!(session.snapshot().weight, Some(10.0));

        let strict = SessionConfig {
            drop_failed_checksums: true,
            ..Default::default()
        };
        let mut session = bookoo_session();
        let events = session.apply(&frame, &strict).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(session.snapshot().weight, None);
        assert_eq!(session.timer_status(), TimerStatus::Reset);
    }

    #[test]
    fn test_button_is_remembered() {
        let mut session = bookoo_session();
        let events = session
            .apply(
                &ScaleReading {
                    button: Some(ButtonEvent::Tare),
                    ..Default::default()
                },
                &SessionConfig::default(),
            )
            .unwrap();
        assert_eq!(events.as_slice(), &[SessionEvent::Button(ButtonEvent::Tare)]);
        assert_eq!(session.snapshot().last_button, Some(ButtonEvent::Tare));
    }
}
