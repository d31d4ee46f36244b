//! The cabin: boarded passengers, current floor, and lifecycle state
//!
//! The cabin's mutex is held only across list mutation, never across a
//! simulated delay. Admission checks headcount and weight independently;
//! both must pass, and a rejected passenger is handed back untouched.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ElevatorConfig;
use crate::floor::FloorId;
use crate::passenger::Passenger;
use crate::ManifestEntry;

/// Cabin lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinState {
    /// Initial (before start) and terminal (after stop)
    Offline,
    /// Running with nothing to do
    Idle,
    /// Dwelling at a floor to board or dispense
    Loading,
    MovingUp,
    MovingDown,
}

struct CabinInner {
    current_floor: FloorId,
    boarded: VecDeque<Passenger>,
    state: CabinState,
}

/// The elevator car.
///
/// Holds the boarded FIFO, the current floor, and the state machine's
/// current state. The serviced counter is shared with the lifecycle
/// controller so it survives stop/start cycles.
pub struct Cabin {
    inner: Mutex<CabinInner>,
    capacity: usize,
    max_load: u32,
    serviced: Arc<AtomicU64>,
}

impl Cabin {
    /// Create a cabin at floor 1, idle
    pub fn new(config: &ElevatorConfig, serviced: Arc<AtomicU64>) -> Self {
        Self {
            inner: Mutex::new(CabinInner {
                current_floor: 1,
                boarded: VecDeque::with_capacity(config.cabin_capacity),
                state: CabinState::Idle,
            }),
            capacity: config.cabin_capacity,
            max_load: config.max_load,
            serviced,
        }
    }

    fn load_of(boarded: &VecDeque<Passenger>) -> u32 {
        boarded.iter().map(|p| p.weight()).sum()
    }

    /// Try to admit a passenger.
    ///
    /// Rejects when the cabin is at headcount capacity or the passenger's
    /// weight would push the total over the maximum load; the passenger is
    /// returned unchanged so the caller can leave it at the head of its
    /// queue. No side effect on rejection.
    pub async fn try_board(&self, passenger: Passenger) -> std::result::Result<(), Passenger> {
        let mut inner = self.inner.lock().await;
        if inner.boarded.len() >= self.capacity {
            return Err(passenger);
        }
        if Self::load_of(&inner.boarded) + passenger.weight() > self.max_load {
            return Err(passenger);
        }
        debug_assert_eq!(
            passenger.origin(),
            inner.current_floor,
            "boarding happens only at the passenger's origin floor"
        );
        inner.boarded.push_back(passenger);
        Ok(())
    }

    /// Remove every boarded passenger whose destination is the current
    /// floor, in one pass.
    ///
    /// Increments the serviced counter by the number removed and transitions
    /// to `Loading` when at least one left. Returns the removed passengers
    /// so the caller can report them; they are dropped afterwards.
    pub async fn dispense(&self) -> Vec<Passenger> {
        let mut inner = self.inner.lock().await;
        let here = inner.current_floor;

        let mut kept = VecDeque::with_capacity(inner.boarded.len());
        let mut delivered = Vec::new();
        for passenger in inner.boarded.drain(..) {
            if passenger.destination() == here {
                delivered.push(passenger);
            } else {
                kept.push_back(passenger);
            }
        }
        inner.boarded = kept;

        if !delivered.is_empty() {
            inner.state = CabinState::Loading;
            self.serviced
                .fetch_add(delivered.len() as u64, Ordering::SeqCst);
        }
        delivered
    }

    /// Sum of boarded weights
    pub async fn current_load(&self) -> u32 {
        Self::load_of(&self.inner.lock().await.boarded)
    }

    /// Number of boarded passengers
    pub async fn passenger_count(&self) -> usize {
        self.inner.lock().await.boarded.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.boarded.is_empty()
    }

    pub async fn current_floor(&self) -> FloorId {
        self.inner.lock().await.current_floor
    }

    pub async fn state(&self) -> CabinState {
        self.inner.lock().await.state
    }

    pub(crate) async fn set_state(&self, state: CabinState) {
        self.inner.lock().await.state = state;
    }

    /// Destination of the head (longest-boarded) passenger.
    ///
    /// The head drives the cabin's direction; later passengers wait their
    /// turn even when their destinations are nearer.
    pub async fn head_destination(&self) -> Option<FloorId> {
        self.inner.lock().await.boarded.front().map(|p| p.destination())
    }

    /// Advance one floor toward `target`, setting the matching moving
    /// state. Returns `(from, to)`.
    pub(crate) async fn step_toward(&self, target: FloorId) -> (FloorId, FloorId) {
        let mut inner = self.inner.lock().await;
        let from = inner.current_floor;
        debug_assert_ne!(from, target, "step_toward called while at the target");
        let to = if target > from {
            inner.state = CabinState::MovingUp;
            from + 1
        } else {
            inner.state = CabinState::MovingDown;
            from - 1
        };
        inner.current_floor = to;
        (from, to)
    }

    /// Boarded passengers as (kind, destination) pairs, boarding order
    pub async fn manifest(&self) -> Vec<ManifestEntry> {
        self.inner
            .lock()
            .await
            .boarded
            .iter()
            .map(|p| ManifestEntry {
                kind: p.kind(),
                destination: p.destination(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) async fn set_floor_for_test(&self, floor: FloorId) {
        self.inner.lock().await.current_floor = floor;
    }
}
