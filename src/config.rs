//! Simulation configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ElevatorError, Result};
use crate::passenger::PassengerKind;

/// Elevator simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElevatorConfig {
    /// Number of floors; floor ids run 1..=floor_count
    pub floor_count: u8,
    /// Maximum number of boarded passengers
    pub cabin_capacity: usize,
    /// Maximum total boarded weight
    pub max_load: u32,
    /// Base unit of simulated time: dwell is one tick, travel between
    /// adjacent floors is two, the idle re-poll interval is one
    #[serde(with = "duration_serde")]
    pub tick: Duration,
    /// Buffer size of the lifecycle event channel
    pub event_capacity: usize,
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            floor_count: 5,
            cabin_capacity: 5,
            max_load: 50,
            tick: Duration::from_millis(250),
            event_capacity: 64,
        }
    }
}

impl ElevatorConfig {
    /// Create a configuration with the given floor count, canonical defaults
    /// for everything else
    pub fn new(floor_count: u8) -> Self {
        Self {
            floor_count,
            ..Self::default()
        }
    }

    /// Set the cabin passenger capacity (builder pattern)
    pub fn with_capacity(mut self, cabin_capacity: usize) -> Self {
        self.cabin_capacity = cabin_capacity;
        self
    }

    /// Set the maximum boarded weight (builder pattern)
    pub fn with_max_load(mut self, max_load: u32) -> Self {
        self.max_load = max_load;
        self
    }

    /// Set the tick duration (builder pattern)
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Set the event channel capacity (builder pattern)
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Check the configuration for values the mover cannot operate under.
    ///
    /// A max load below the heaviest passenger kind is rejected here because
    /// such a passenger could never be admitted and would stall boarding at
    /// its floor forever.
    pub fn validate(&self) -> Result<()> {
        if self.floor_count < 2 {
            return Err(ElevatorError::Config(format!(
                "floor_count must be at least 2, got {}",
                self.floor_count
            )));
        }
        if self.cabin_capacity == 0 {
            return Err(ElevatorError::Config(
                "cabin_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_load < PassengerKind::heaviest() {
            return Err(ElevatorError::Config(format!(
                "max_load {} is below the heaviest passenger kind ({})",
                self.max_load,
                PassengerKind::heaviest()
            )));
        }
        if self.tick.is_zero() {
            return Err(ElevatorError::Config("tick must be non-zero".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(ElevatorError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
