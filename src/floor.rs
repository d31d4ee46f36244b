//! Per-floor waiting queues and the registry that owns them
//!
//! Locking is fine-grained: each floor queue carries its own mutex, so
//! producers targeting different floors never contend. Every operation that
//! touches more than one floor acquires floor locks in ascending-id order,
//! which rules out deadlock between any two multi-floor scans.

use std::collections::VecDeque;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cabin::Cabin;
use crate::error::{ElevatorError, Result};
use crate::passenger::Passenger;
use crate::{FloorManifest, ManifestEntry};

/// Floor identifier, 1-based
pub type FloorId = u8;

/// The ordered set of passengers waiting at one floor
pub struct FloorQueue {
    id: FloorId,
    waiting: Mutex<VecDeque<Passenger>>,
}

impl FloorQueue {
    fn new(id: FloorId) -> Self {
        Self {
            id,
            waiting: Mutex::new(VecDeque::new()),
        }
    }

    /// Floor id
    pub fn id(&self) -> FloorId {
        self.id
    }

    /// Append a passenger. Holds only this floor's lock.
    pub async fn push(&self, passenger: Passenger) {
        debug_assert_eq!(
            passenger.origin(),
            self.id,
            "passenger queued at a floor other than its origin"
        );
        self.waiting.lock().await.push_back(passenger);
    }

    /// Number of waiting passengers
    pub async fn len(&self) -> usize {
        self.waiting.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.waiting.lock().await.is_empty()
    }

    /// Waiting passengers as (kind, destination) pairs, FIFO order
    pub async fn manifest(&self) -> Vec<ManifestEntry> {
        self.waiting
            .lock()
            .await
            .iter()
            .map(|p| ManifestEntry {
                kind: p.kind(),
                destination: p.destination(),
            })
            .collect()
    }
}

/// The fixed-size set of all floor queues.
///
/// Allocated as a whole when the simulation starts and dropped as a whole
/// when it stops; individual queues are never constructed or destroyed
/// independently.
pub struct RequestRegistry {
    floors: Vec<FloorQueue>,
}

impl RequestRegistry {
    /// Create queues for floors `1..=floor_count`
    pub fn new(floor_count: u8) -> Self {
        let floors = (1..=floor_count).map(FloorQueue::new).collect();
        Self { floors }
    }

    /// Number of floors
    pub fn floor_count(&self) -> u8 {
        self.floors.len() as u8
    }

    fn floor(&self, id: FloorId) -> Option<&FloorQueue> {
        if id == 0 {
            return None;
        }
        self.floors.get(id as usize - 1)
    }

    /// Queue a passenger at its origin floor.
    ///
    /// Takes only that floor's lock. Fails with `InvalidFloor` when the
    /// origin is out of range, without touching any queue.
    pub async fn enqueue(&self, passenger: Passenger) -> Result<()> {
        let floor = self
            .floor(passenger.origin())
            .ok_or(ElevatorError::InvalidFloor(passenger.origin()))?;
        floor.push(passenger).await;
        Ok(())
    }

    /// Whether any floor has a waiting passenger.
    ///
    /// Scans floors in ascending order, locking one queue at a time.
    pub async fn has_any_waiting(&self) -> bool {
        for floor in &self.floors {
            if !floor.is_empty().await {
                return true;
            }
        }
        false
    }

    /// The waiting floor closest to `from`, or `None` when all queues are
    /// empty.
    ///
    /// All floor locks are taken in ascending order and held together so the
    /// selection sees one consistent view. The scan replaces its candidate
    /// only on strictly smaller distance, so ties resolve to the lowest
    /// floor id. That tie-break is an observable contract, not an accident.
    pub async fn closest_waiting_floor(&self, from: FloorId) -> Option<FloorId> {
        let mut guards = Vec::with_capacity(self.floors.len());
        for floor in &self.floors {
            guards.push(floor.waiting.lock().await);
        }

        let mut best: Option<(FloorId, u8)> = None;
        for (floor, guard) in self.floors.iter().zip(guards.iter()) {
            if guard.is_empty() {
                continue;
            }
            let distance = floor.id.abs_diff(from);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((floor.id, distance)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Move waiting passengers at `floor` into the cabin, FIFO, until one
    /// does not fit.
    ///
    /// Admission is strict head-of-queue: the first passenger that would
    /// exceed the cabin's capacity or weight limit stays at the head and
    /// ends the drain; a lighter passenger further back is not considered.
    /// Returns the ids of the passengers boarded, in boarding order.
    ///
    /// Lock order is floor then cabin; this is the only place in the crate
    /// that holds two container locks, so no cycle is possible.
    pub async fn drain_boarding(&self, floor_id: FloorId, cabin: &Cabin) -> Vec<Uuid> {
        let Some(floor) = self.floor(floor_id) else {
            return Vec::new();
        };
        let mut waiting = floor.waiting.lock().await;
        let mut boarded = Vec::new();
        while let Some(head) = waiting.pop_front() {
            let id = head.id();
            match cabin.try_board(head).await {
                Ok(()) => boarded.push(id),
                Err(rejected) => {
                    waiting.push_front(rejected);
                    break;
                }
            }
        }
        boarded
    }

    /// Total waiting passengers across all floors
    pub async fn total_waiting(&self) -> usize {
        let mut total = 0;
        for floor in &self.floors {
            total += floor.len().await;
        }
        total
    }

    /// Empty every floor queue, ascending order; returns how many passengers
    /// were discarded.
    ///
    /// Shutdown only: discarded passengers are never serviced.
    pub async fn discard_all(&self) -> usize {
        let mut discarded = 0;
        for floor in &self.floors {
            let mut waiting = floor.waiting.lock().await;
            discarded += waiting.len();
            waiting.clear();
        }
        discarded
    }

    /// Per-floor manifests for snapshots, ascending floor order
    pub async fn manifests(&self) -> Vec<FloorManifest> {
        let mut manifests = Vec::with_capacity(self.floors.len());
        for floor in &self.floors {
            manifests.push(FloorManifest {
                floor: floor.id,
                waiting: floor.manifest().await,
            });
        }
        manifests
    }
}
