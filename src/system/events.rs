//! Session event bus
//! Live observers subscribe here; the controller publishes without ever blocking

use crate::scales::ScaleProtocol;
use crate::types::{ButtonEvent, TimerStatus};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    pubsub::{PubSubChannel, Subscriber, WaitResult},
};
use log::{debug, warn};
use thiserror::Error;

pub const EVENT_QUEUE_DEPTH: usize = 32;
pub const MAX_SUBSCRIBERS: usize = 4;
pub const EVENT_HISTORY_LEN: usize = 32;

// The controller only publishes through immediate publishers, which take no slot.
const MAX_PUBLISHERS: usize = 1;

type EventChannel = PubSubChannel<
    CriticalSectionRawMutex,
    SessionEvent,
    EVENT_QUEUE_DEPTH,
    MAX_SUBSCRIBERS,
    MAX_PUBLISHERS,
>;

/// Something observers may care about, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected {
        device: &'static str,
        protocol: ScaleProtocol,
    },
    Disconnected {
        device: &'static str,
    },
    TimerChanged {
        from: TimerStatus,
        to: TimerStatus,
        millis: u32,
    },
    Button(ButtonEvent),
    ChecksumFailed {
        device: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventBusError {
    #[error("all event subscriber slots are taken")]
    NoSubscriberSlots,
}

pub struct EventBus {
    channel: EventChannel,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channel: PubSubChannel::new(),
        }
    }

    /// Publish without waiting. Lagging subscribers lose their oldest messages.
    pub fn publish(&self, event: SessionEvent) {
        debug!("Publishing session event: {:?}", event);
        self.channel.immediate_publisher().publish_immediate(event);
    }

    pub fn subscriber(&self) -> Result<EventSubscriber<'_>, EventBusError> {
        self.channel
            .subscriber()
            .map(|inner| EventSubscriber { inner })
            .map_err(|_| EventBusError::NoSubscriberSlots)
    }
}

pub struct EventSubscriber<'a> {
    inner: Subscriber<
        'a,
        CriticalSectionRawMutex,
        SessionEvent,
        EVENT_QUEUE_DEPTH,
        MAX_SUBSCRIBERS,
        MAX_PUBLISHERS,
    >,
}

impl<'a> EventSubscriber<'a> {
    /// Wait for the next event
    pub async fn next_event(&mut self) -> SessionEvent {
        loop {
            match self.inner.next_message().await {
                WaitResult::Lagged(count) => {
                    warn!("Event subscriber lagged, {} events lost", count);
                    continue;
                }
                WaitResult::Message(event) => return event,
            }
        }
    }

    /// Next queued event, if any, without blocking
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.inner.try_next_message()? {
                WaitResult::Lagged(count) => {
                    warn!("Event subscriber lagged, {} events lost", count);
                    continue;
                }
                WaitResult::Message(event) => return Some(event),
            }
        }
    }

    /// Drain every queued event
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let mut first = bus.subscriber().unwrap();
        let mut second = bus.subscriber().unwrap();

        bus.publish(SessionEvent::Button(ButtonEvent::Tare));

        assert_eq!(
            first.try_next_event(),
            Some(SessionEvent::Button(ButtonEvent::Tare))
        );
        assert_eq!(
            second.drain(),
            vec![SessionEvent::Button(ButtonEvent::Tare)]
        );
        assert_eq!(first.try_next_event(), None);
    }

    #[test]
    fn test_subscriber_slots_are_bounded() {
        let bus = EventBus::new();
        let _subscribers: Vec<_> = (0..MAX_SUBSCRIBERS)
            .map(|_| bus.subscriber().unwrap())
            .collect();
        assert_eq!(
            bus.subscriber().err(),
            Some(EventBusError::NoSubscriberSlots)
        );
    }

    #[test]
    fn test_lagging_subscriber_keeps_newest() {
        let bus = EventBus::new();
        let mut subscriber = bus.subscriber().unwrap();
        for millis in 0..(EVENT_QUEUE_DEPTH as u32 + 5) {
            bus.publish(SessionEvent::TimerChanged {
                from: TimerStatus::Reset,
                to: TimerStatus::Running,
                millis,
            });
        }
        let events = subscriber.drain();
        assert_eq!(events.len(), EVENT_QUEUE_DEPTH);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::TimerChanged {
                from: TimerStatus::Reset,
                to: TimerStatus::Running,
                millis: EVENT_QUEUE_DEPTH as u32 + 4,
            })
        );
    }
}
