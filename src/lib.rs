//! # liftsim
//!
//! A capacity-constrained elevator simulation driven by a single background
//! dispatch loop.
//!
//! ## Core behavior
//!
//! - Per-floor FIFO waiting queues with fine-grained locking
//! - A five-passenger, weight-limited cabin with strict head-of-queue
//!   admission
//! - Closest-request dispatch with a deterministic lowest-floor tie-break
//! - One floor of travel per tick; dwell costs one tick, travel two
//! - Opportunistic pickup at every floor the cabin passes through
//! - Graceful shutdown: boarded passengers are delivered, waiting ones
//!   are discarded
//! - Lifecycle event notifications and consistent read-only snapshots
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use liftsim::{Elevator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let elevator = Elevator::builder().build()?;
//!     elevator.start().await?;
//!
//!     // A small passenger at floor 4, heading for floor 1
//!     elevator.issue_request(4, 1, 0).await?;
//!
//!     let snapshot = elevator.snapshot().await?;
//!     println!("cabin at floor {}", snapshot.current_floor);
//!
//!     elevator.stop().await?;
//!     println!("serviced {} passengers", elevator.serviced_count());
//!     Ok(())
//! }
//! ```

pub mod cabin;
pub mod config;
pub mod error;
pub mod event;
pub mod floor;
pub mod manager;
mod mover;
pub mod passenger;

pub use cabin::{Cabin, CabinState};
pub use config::ElevatorConfig;
pub use error::{ElevatorError, Result};
pub use event::{events, ElevatorEvent, EventEmitter, EventKind};
pub use floor::{FloorId, FloorQueue, RequestRegistry};
pub use manager::{Elevator, ElevatorBuilder};
pub use passenger::{Passenger, PassengerKind};

use serde::{Deserialize, Serialize};

/// One passenger as reported in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: PassengerKind,
    pub destination: FloorId,
}

/// The waiting queue of one floor as reported in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorManifest {
    pub floor: FloorId,
    /// FIFO order: index 0 boards first
    pub waiting: Vec<ManifestEntry>,
}

/// Point-in-time view of the whole simulation
///
/// Each container is locked momentarily in turn while the snapshot is
/// assembled, so the view is consistent per container and best-effort
/// across containers.
///
/// # Example
///
/// ```rust,ignore
/// let snapshot = elevator.snapshot().await?;
/// println!("{:?} at floor {}", snapshot.state, snapshot.current_floor);
/// for floor in &snapshot.floors {
///     println!("floor {}: {} waiting", floor.floor, floor.waiting.len());
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatorSnapshot {
    /// Cabin lifecycle state
    pub state: CabinState,
    /// Where the cabin is
    pub current_floor: FloorId,
    /// Boarded passengers, boarding order
    pub cabin: Vec<ManifestEntry>,
    /// Waiting passengers per floor, ascending floor order
    pub floors: Vec<FloorManifest>,
    /// Cumulative passengers delivered across all runs
    pub serviced: u64,
}

impl ElevatorSnapshot {
    /// Total passengers waiting across all floors
    pub fn total_waiting(&self) -> usize {
        self.floors.iter().map(|f| f.waiting.len()).sum()
    }

    /// Whether nothing is waiting or boarded
    pub fn is_quiescent(&self) -> bool {
        self.cabin.is_empty() && self.total_waiting() == 0
    }
}
