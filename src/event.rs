//! Event system for simulation lifecycle notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::floor::FloorId;
use crate::passenger::PassengerKind;

/// What happened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// Simulation started; cabin is at floor 1, idle
    Started,
    /// Simulation stopped after draining the cabin; passengers still waiting
    /// on floors were discarded, not serviced
    Stopped { discarded: usize },
    /// A request passed validation and was queued at its origin floor
    RequestQueued {
        passenger: Uuid,
        kind: PassengerKind,
        origin: FloorId,
        destination: FloorId,
    },
    /// A passenger moved from a floor queue into the cabin
    PassengerBoarded { passenger: Uuid, floor: FloorId },
    /// A passenger reached its destination and left the cabin
    PassengerDelivered { passenger: Uuid, floor: FloorId },
    /// The cabin advanced one floor
    CabinMoved { from: FloorId, to: FloorId },
}

impl EventKind {
    /// The catalog key for this event
    pub fn key(&self) -> &'static str {
        match self {
            Self::Started => events::STARTED,
            Self::Stopped { .. } => events::STOPPED,
            Self::RequestQueued { .. } => events::REQUEST_QUEUED,
            Self::PassengerBoarded { .. } => events::PASSENGER_BOARDED,
            Self::PassengerDelivered { .. } => events::PASSENGER_DELIVERED,
            Self::CabinMoved { .. } => events::CABIN_MOVED,
        }
    }
}

/// Elevator lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatorEvent {
    /// What happened
    #[serde(flatten)]
    pub kind: EventKind,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ElevatorEvent {
    /// Create a new event stamped with the current time
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    /// The catalog key for this event
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }
}

/// Event emitter
///
/// A thin wrapper over a broadcast channel. Emitting never blocks and never
/// fails; events published with no live subscribers are dropped.
#[derive(Clone)]
pub struct EventEmitter {
    sender: Arc<broadcast::Sender<ElevatorEvent>>,
}

impl EventEmitter {
    /// Create a new event emitter
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Emit an event
    pub fn emit(&self, event: ElevatorEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<ElevatorEvent> {
        self.sender.subscribe()
    }
}

/// Event catalog - predefined event keys
pub mod events {
    pub const STARTED: &str = "elevator.started";
    pub const STOPPED: &str = "elevator.stopped";
    pub const REQUEST_QUEUED: &str = "elevator.request.queued";
    pub const PASSENGER_BOARDED: &str = "elevator.passenger.boarded";
    pub const PASSENGER_DELIVERED: &str = "elevator.passenger.delivered";
    pub const CABIN_MOVED: &str = "elevator.cabin.moved";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new() {
        let event = ElevatorEvent::new(EventKind::Started);
        assert_eq!(event.key(), "elevator.started");
    }

    #[test]
    fn test_event_keys() {
        assert_eq!(EventKind::Started.key(), events::STARTED);
        assert_eq!(EventKind::Stopped { discarded: 0 }.key(), events::STOPPED);
        assert_eq!(
            EventKind::CabinMoved { from: 1, to: 2 }.key(),
            events::CABIN_MOVED
        );
    }

    #[test]
    fn test_event_timestamp() {
        let before = Utc::now();
        let event = ElevatorEvent::new(EventKind::Started);
        let after = Utc::now();

        assert!(event.timestamp >= before);
        assert!(event.timestamp <= after);
    }

    #[test]
    fn test_event_emitter_clone() {
        let emitter = EventEmitter::new(16);
        let cloned = emitter.clone();

        // Both handles feed the same channel
        let mut rx = emitter.subscribe();
        cloned.emit(ElevatorEvent::new(EventKind::Started));
        assert_eq!(rx.try_recv().unwrap().key(), events::STARTED);
    }

    #[tokio::test]
    async fn test_event_emitter_subscribe() {
        let emitter = EventEmitter::new(16);
        let mut receiver = emitter.subscribe();

        emitter.emit(ElevatorEvent::new(EventKind::CabinMoved { from: 2, to: 3 }));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.key(), events::CABIN_MOVED);
        if let EventKind::CabinMoved { from, to } = event.kind {
            assert_eq!((from, to), (2, 3));
        } else {
            panic!("Expected CabinMoved");
        }
    }

    #[tokio::test]
    async fn test_event_emitter_multiple_subscribers() {
        let emitter = EventEmitter::new(16);
        let mut rx1 = emitter.subscribe();
        let mut rx2 = emitter.subscribe();

        emitter.emit(ElevatorEvent::new(EventKind::Stopped { discarded: 2 }));

        assert_eq!(rx1.recv().await.unwrap().key(), events::STOPPED);
        assert_eq!(rx2.recv().await.unwrap().key(), events::STOPPED);
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let emitter = EventEmitter::new(4);
        emitter.emit(ElevatorEvent::new(EventKind::Started));
    }

    #[test]
    fn test_event_serialization() {
        let event = ElevatorEvent::new(EventKind::RequestQueued {
            passenger: Uuid::new_v4(),
            kind: PassengerKind::Small,
            origin: 4,
            destination: 1,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("request_queued"));
        assert!(json.contains("timestamp"));

        let parsed: ElevatorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.key(), events::REQUEST_QUEUED);
    }

    #[test]
    fn test_event_catalog() {
        assert_eq!(events::STARTED, "elevator.started");
        assert_eq!(events::STOPPED, "elevator.stopped");
        assert_eq!(events::REQUEST_QUEUED, "elevator.request.queued");
        assert_eq!(events::PASSENGER_BOARDED, "elevator.passenger.boarded");
        assert_eq!(events::PASSENGER_DELIVERED, "elevator.passenger.delivered");
        assert_eq!(events::CABIN_MOVED, "elevator.cabin.moved");
    }
}
