//! The background mover task
//!
//! One long-lived task makes one scheduling decision per tick: drop off,
//! board, or travel. Dwell (boarding/unloading) costs one tick, travel
//! between adjacent floors costs two, and an idle cabin re-polls once per
//! tick. Every sleep happens with no container lock held, so request
//! producers are never blocked by simulated time, only by actual list
//! mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cabin::{Cabin, CabinState};
use crate::event::{ElevatorEvent, EventEmitter, EventKind};
use crate::floor::{FloorId, RequestRegistry};
use crate::passenger::Passenger;

pub(crate) struct Mover {
    pub(crate) registry: Arc<RequestRegistry>,
    pub(crate) cabin: Arc<Cabin>,
    pub(crate) active: Arc<AtomicBool>,
    pub(crate) emitter: EventEmitter,
    pub(crate) tick: Duration,
}

impl Mover {
    /// Spawn the mover loop onto the current runtime
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!("mover started");
        while self.active.load(Ordering::SeqCst) {
            self.step().await;
        }
        self.drain().await;
        self.cabin.set_state(CabinState::Offline).await;
        info!("mover exited");
    }

    /// One running tick: dispense, then opportunistic boarding, then either
    /// head-target travel or idle-cabin selection.
    async fn step(&self) {
        // Drop off anyone whose destination is this floor. Unloading costs
        // a dwell tick and ends the decision.
        let delivered = self.cabin.dispense().await;
        if !delivered.is_empty() {
            self.report_delivered(&delivered).await;
            self.sleep_ticks(1).await;
            return;
        }

        // Pickup in passing: whoever waits here boards now, whether or not
        // this floor was the original target.
        let here = self.cabin.current_floor().await;
        let boarded = self.registry.drain_boarding(here, &self.cabin).await;
        if !boarded.is_empty() {
            self.cabin.set_state(CabinState::Loading).await;
            for passenger in &boarded {
                debug!(passenger = %passenger, floor = here, "passenger boarded");
                self.emitter.emit(ElevatorEvent::new(EventKind::PassengerBoarded {
                    passenger: *passenger,
                    floor: here,
                }));
            }
        }

        // The head passenger drives direction.
        if let Some(target) = self.cabin.head_destination().await {
            if target == here {
                self.sleep_ticks(1).await;
            } else {
                self.travel(target).await;
            }
            return;
        }

        // Empty cabin: head for the closest waiting floor, or idle.
        match self.registry.closest_waiting_floor(here).await {
            None => {
                self.cabin.set_state(CabinState::Idle).await;
                self.sleep_ticks(1).await;
            }
            Some(target) if target == here => {
                // A request landed here after the boarding attempt above;
                // dwell and pick it up next tick.
                self.cabin.set_state(CabinState::Loading).await;
                self.sleep_ticks(1).await;
            }
            Some(target) => {
                self.travel(target).await;
            }
        }
    }

    /// Advance one floor toward `target` and pay the travel time
    async fn travel(&self, target: FloorId) {
        let (from, to) = self.cabin.step_toward(target).await;
        debug!(from, to, target, "cabin moved");
        self.emitter
            .emit(ElevatorEvent::new(EventKind::CabinMoved { from, to }));
        self.sleep_ticks(2).await;
    }

    /// Finish delivering everyone already boarded, never boarding again,
    /// then exit. Floor queues are left for the controller to discard.
    async fn drain(&self) {
        let remaining = self.cabin.passenger_count().await;
        if remaining > 0 {
            info!(remaining, "draining cabin before shutdown");
        }
        loop {
            let delivered = self.cabin.dispense().await;
            if !delivered.is_empty() {
                self.report_delivered(&delivered).await;
                self.sleep_ticks(1).await;
                continue;
            }
            let Some(target) = self.cabin.head_destination().await else {
                break;
            };
            self.travel(target).await;
        }
    }

    async fn report_delivered(&self, delivered: &[Passenger]) {
        let floor = self.cabin.current_floor().await;
        for passenger in delivered {
            debug!(passenger = %passenger.id(), floor, "passenger delivered");
            self.emitter
                .emit(ElevatorEvent::new(EventKind::PassengerDelivered {
                    passenger: passenger.id(),
                    floor,
                }));
        }
    }

    async fn sleep_ticks(&self, ticks: u32) {
        tokio::time::sleep(self.tick * ticks).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevatorConfig;
    use crate::passenger::PassengerKind;
    use std::sync::atomic::AtomicU64;

    fn harness(config: &ElevatorConfig) -> (Arc<RequestRegistry>, Arc<Cabin>, Arc<AtomicU64>, Arc<AtomicBool>) {
        let serviced = Arc::new(AtomicU64::new(0));
        let registry = Arc::new(RequestRegistry::new(config.floor_count));
        let cabin = Arc::new(Cabin::new(config, Arc::clone(&serviced)));
        let active = Arc::new(AtomicBool::new(true));
        (registry, cabin, serviced, active)
    }

    fn spawn_mover(
        config: &ElevatorConfig,
        registry: &Arc<RequestRegistry>,
        cabin: &Arc<Cabin>,
        active: &Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        Mover {
            registry: Arc::clone(registry),
            cabin: Arc::clone(cabin),
            active: Arc::clone(active),
            emitter: EventEmitter::new(config.event_capacity),
            tick: config.tick,
        }
        .spawn()
    }

    fn fast_config() -> ElevatorConfig {
        ElevatorConfig::default().with_tick(Duration::from_millis(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_mover_services_single_request() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);
        let handle = spawn_mover(&config, &registry, &cabin, &active);

        registry
            .enqueue(Passenger::new(PassengerKind::Small, 4, 1))
            .await
            .unwrap();

        // 1 -> 4 is three moves, boarding, 4 -> 1 three moves, dispense:
        // well under 100 ticks.
        for _ in 0..1000 {
            if serviced.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(config.tick).await;
        }
        assert_eq!(serviced.load(Ordering::SeqCst), 1);
        assert!(cabin.is_empty().await);
        assert!(!registry.has_any_waiting().await);
        assert_eq!(cabin.current_floor().await, 1);

        active.store(false, Ordering::SeqCst);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mover_idles_when_no_requests() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);
        let handle = spawn_mover(&config, &registry, &cabin, &active);

        tokio::time::sleep(config.tick * 20).await;
        assert_eq!(cabin.state().await, CabinState::Idle);
        assert_eq!(cabin.current_floor().await, 1);
        assert_eq!(serviced.load(Ordering::SeqCst), 0);

        active.store(false, Ordering::SeqCst);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mover_picks_up_in_passing() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);

        // The cabin will head from 1 toward 5; a passenger waiting at 3
        // going the same way is picked up on the way through.
        registry
            .enqueue(Passenger::new(PassengerKind::Small, 1, 5))
            .await
            .unwrap();
        registry
            .enqueue(Passenger::new(PassengerKind::Small, 3, 5))
            .await
            .unwrap();

        let handle = spawn_mover(&config, &registry, &cabin, &active);

        for _ in 0..1000 {
            if serviced.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::time::sleep(config.tick).await;
        }
        assert_eq!(serviced.load(Ordering::SeqCst), 2);
        assert_eq!(cabin.current_floor().await, 5);

        active.store(false, Ordering::SeqCst);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_delivers_boarded_not_waiting() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);

        // Board one passenger directly, leave another waiting on a floor.
        cabin
            .try_board(Passenger::new(PassengerKind::Small, 1, 3))
            .await
            .unwrap();
        registry
            .enqueue(Passenger::new(PassengerKind::Small, 2, 5))
            .await
            .unwrap();

        // Stop before the first tick: the mover must still deliver the
        // boarded passenger, and must not board the waiting one.
        active.store(false, Ordering::SeqCst);
        let handle = spawn_mover(&config, &registry, &cabin, &active);
        handle.await.unwrap();

        assert_eq!(serviced.load(Ordering::SeqCst), 1);
        assert!(cabin.is_empty().await);
        assert_eq!(cabin.state().await, CabinState::Offline);
        assert_eq!(registry.total_waiting().await, 1, "waiting passenger is not drained");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_invariants_hold_under_load() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);

        for floor in 1..=5u8 {
            for _ in 0..3 {
                let destination = if floor == 1 { 5 } else { 1 };
                registry
                    .enqueue(Passenger::new(PassengerKind::ExtraLarge, floor, destination))
                    .await
                    .unwrap();
            }
        }
        let issued = 15;

        let handle = spawn_mover(&config, &registry, &cabin, &active);

        for _ in 0..10_000 {
            assert!(cabin.passenger_count().await <= 5);
            assert!(cabin.current_load().await <= 50);
            if serviced.load(Ordering::SeqCst) == issued {
                break;
            }
            tokio::time::sleep(config.tick).await;
        }
        assert_eq!(serviced.load(Ordering::SeqCst), issued);

        active.store(false, Ordering::SeqCst);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_conservation_none_lost_or_duplicated() {
        let config = fast_config();
        let (registry, cabin, serviced, active) = harness(&config);
        let handle = spawn_mover(&config, &registry, &cabin, &active);

        let issued = 8u64;
        for i in 0..issued {
            let origin = (i % 5 + 1) as u8;
            let destination = ((i + 2) % 5 + 1) as u8;
            registry
                .enqueue(Passenger::new(PassengerKind::Medium, origin, destination))
                .await
                .unwrap();
        }

        for _ in 0..10_000 {
            if serviced.load(Ordering::SeqCst) == issued {
                break;
            }
            tokio::time::sleep(config.tick).await;
        }
        // Conservation at quiescence: everyone issued was serviced exactly
        // once; nobody is left waiting or boarded.
        assert_eq!(serviced.load(Ordering::SeqCst), issued);
        assert!(cabin.is_empty().await);
        assert_eq!(registry.total_waiting().await, 0);

        active.store(false, Ordering::SeqCst);
        handle.await.unwrap();
    }
}
