//! The lifecycle controller: start, stop, request intake, snapshots
//!
//! `Elevator` is the long-lived handle. The registry, cabin, and mover task
//! are allocated together by `start` and torn down together by `stop`; the
//! serviced counter lives on the controller itself and deliberately
//! survives stop/start cycles.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cabin::Cabin;
use crate::config::ElevatorConfig;
use crate::error::{ElevatorError, Result};
use crate::event::{ElevatorEvent, EventEmitter, EventKind};
use crate::floor::{FloorId, RequestRegistry};
use crate::mover::Mover;
use crate::passenger::{Passenger, PassengerKind};
use crate::ElevatorSnapshot;

/// Everything that exists only while the simulation runs
struct Active {
    registry: Arc<RequestRegistry>,
    cabin: Arc<Cabin>,
    mover: JoinHandle<()>,
    mover_active: Arc<AtomicBool>,
}

/// The elevator simulation controller
pub struct Elevator {
    config: ElevatorConfig,
    emitter: EventEmitter,
    serviced: Arc<AtomicU64>,
    active: RwLock<Option<Active>>,
}

impl Elevator {
    /// Create a stopped elevator with the given configuration.
    ///
    /// Fails with `Config` when the configuration is unusable; nothing is
    /// allocated before validation, so there is nothing to roll back.
    pub fn new(config: ElevatorConfig) -> Result<Self> {
        config.validate()?;
        let emitter = EventEmitter::new(config.event_capacity);
        Ok(Self {
            config,
            emitter,
            serviced: Arc::new(AtomicU64::new(0)),
            active: RwLock::new(None),
        })
    }

    /// Builder entry point
    pub fn builder() -> ElevatorBuilder {
        ElevatorBuilder::new()
    }

    /// The configuration this elevator was built with
    pub fn config(&self) -> &ElevatorConfig {
        &self.config
    }

    /// Start the simulation: allocate the floor queues and cabin, spawn the
    /// mover.
    ///
    /// Fails with `AlreadyActive` when already running, with no change to
    /// the serviced counter or any allocation. All pieces are owned by the
    /// controller slot, so a failure anywhere on this path drops whatever
    /// was partially built.
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.active.write().await;
        if slot.is_some() {
            return Err(ElevatorError::AlreadyActive);
        }

        let registry = Arc::new(RequestRegistry::new(self.config.floor_count));
        let cabin = Arc::new(Cabin::new(&self.config, Arc::clone(&self.serviced)));
        let mover_active = Arc::new(AtomicBool::new(true));
        let mover = Mover {
            registry: Arc::clone(&registry),
            cabin: Arc::clone(&cabin),
            active: Arc::clone(&mover_active),
            emitter: self.emitter.clone(),
            tick: self.config.tick,
        }
        .spawn();

        *slot = Some(Active {
            registry,
            cabin,
            mover,
            mover_active,
        });

        info!(floors = self.config.floor_count, "elevator started");
        self.emitter.emit(ElevatorEvent::new(EventKind::Started));
        Ok(())
    }

    /// Stop the simulation.
    ///
    /// Signals the mover, which finishes delivering everyone already
    /// boarded (never boarding again) and exits; blocks until it has.
    /// Passengers still waiting on floors are discarded, not serviced.
    /// The serviced counter is NOT reset. Fails with `NotActive` when
    /// already stopped.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.active.write().await;
        let Some(active) = slot.take() else {
            return Err(ElevatorError::NotActive);
        };

        active.mover_active.store(false, Ordering::SeqCst);
        if let Err(err) = active.mover.await {
            warn!(error = %err, "mover task did not exit cleanly");
        }

        let discarded = active.registry.discard_all().await;
        if discarded > 0 {
            warn!(discarded, "discarded waiting passengers at shutdown");
        }

        info!(
            discarded,
            serviced = self.serviced.load(Ordering::SeqCst),
            "elevator stopped"
        );
        self.emitter
            .emit(ElevatorEvent::new(EventKind::Stopped { discarded }));
        // The registry and cabin drop here, freeing any state the drain
        // left behind.
        Ok(())
    }

    /// Validate and queue one transport request.
    ///
    /// Validation failures (`InvalidFloor`, `InvalidKind`) are reported
    /// without touching any queue and do not depend on lifecycle state;
    /// a valid request against a stopped elevator fails with `NotActive`.
    /// Returns the id assigned to the queued passenger.
    pub async fn issue_request(
        &self,
        origin: FloorId,
        destination: FloorId,
        kind_code: u8,
    ) -> Result<Uuid> {
        let kind =
            PassengerKind::from_code(kind_code).ok_or(ElevatorError::InvalidKind(kind_code))?;
        if !self.valid_floor(origin) {
            return Err(ElevatorError::InvalidFloor(origin));
        }
        if !self.valid_floor(destination) {
            return Err(ElevatorError::InvalidFloor(destination));
        }

        let registry = {
            let slot = self.active.read().await;
            let Some(active) = slot.as_ref() else {
                return Err(ElevatorError::NotActive);
            };
            Arc::clone(&active.registry)
        };

        let passenger = Passenger::new(kind, origin, destination);
        let id = passenger.id();
        registry.enqueue(passenger).await?;

        self.emitter.emit(ElevatorEvent::new(EventKind::RequestQueued {
            passenger: id,
            kind,
            origin,
            destination,
        }));
        Ok(id)
    }

    /// A consistent read-only view of the simulation.
    ///
    /// Each container is locked momentarily in turn; the view is
    /// best-effort across containers (a passenger mid-transfer may appear
    /// in neither manifest), which matches the reporting contract.
    pub async fn snapshot(&self) -> Result<ElevatorSnapshot> {
        let (registry, cabin) = {
            let slot = self.active.read().await;
            let Some(active) = slot.as_ref() else {
                return Err(ElevatorError::NotActive);
            };
            (Arc::clone(&active.registry), Arc::clone(&active.cabin))
        };

        Ok(ElevatorSnapshot {
            state: cabin.state().await,
            current_floor: cabin.current_floor().await,
            cabin: cabin.manifest().await,
            floors: registry.manifests().await,
            serviced: self.serviced_count(),
        })
    }

    /// Cumulative passengers delivered, across all start/stop cycles
    pub fn serviced_count(&self) -> u64 {
        self.serviced.load(Ordering::SeqCst)
    }

    /// Whether the simulation is currently running
    pub async fn is_active(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<ElevatorEvent> {
        self.emitter.subscribe()
    }

    fn valid_floor(&self, floor: FloorId) -> bool {
        (1..=self.config.floor_count).contains(&floor)
    }
}

/// Builder for [`Elevator`]
pub struct ElevatorBuilder {
    config: ElevatorConfig,
}

impl Default for ElevatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ElevatorBuilder {
    /// Start from the canonical configuration (5 floors, capacity 5, max
    /// load 50)
    pub fn new() -> Self {
        Self {
            config: ElevatorConfig::default(),
        }
    }

    /// Set the number of floors
    pub fn with_floors(mut self, floor_count: u8) -> Self {
        self.config.floor_count = floor_count;
        self
    }

    /// Set the cabin passenger capacity
    pub fn with_capacity(mut self, cabin_capacity: usize) -> Self {
        self.config.cabin_capacity = cabin_capacity;
        self
    }

    /// Set the maximum boarded weight
    pub fn with_max_load(mut self, max_load: u32) -> Self {
        self.config.max_load = max_load;
        self
    }

    /// Set the tick duration
    pub fn with_tick(mut self, tick: std::time::Duration) -> Self {
        self.config.tick = tick;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.config.event_capacity = event_capacity;
        self
    }

    /// Validate the configuration and build a stopped elevator
    pub fn build(self) -> Result<Elevator> {
        Elevator::new(self.config)
    }
}
