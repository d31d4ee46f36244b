//! Error types for the elevator simulation
//!
//! All errors implement the `std::error::Error` trait via `thiserror::Error`.
//!
//! Argument errors (`InvalidFloor`, `InvalidKind`) and lifecycle errors
//! (`AlreadyActive`, `NotActive`) are reported before any state is touched,
//! so every operation is safe to re-attempt once the triggering condition is
//! fixed. There is no retry policy.
//!
//! # Example
//!
//! ```rust,ignore
//! use liftsim::{Elevator, ElevatorError};
//!
//! match elevator.issue_request(9, 1, 0).await {
//!     Ok(id) => println!("queued {id}"),
//!     Err(ElevatorError::InvalidFloor(floor)) => {
//!         eprintln!("floor {floor} is out of range");
//!     }
//!     Err(e) => eprintln!("unexpected error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::floor::FloorId;

/// Elevator simulation error type
#[derive(Error, Debug)]
pub enum ElevatorError {
    /// Floor outside the configured range
    #[error("Invalid floor: {0}")]
    InvalidFloor(FloorId),

    /// Unknown passenger kind code (valid codes are 0..=3)
    #[error("Invalid passenger kind code: {0}")]
    InvalidKind(u8),

    /// `start` called while the simulation is already running
    #[error("Elevator is already active")]
    AlreadyActive,

    /// Operation requires a running simulation
    #[error("Elevator is not active")]
    NotActive,

    /// Allocation or task-spawn failure during start; partial state is rolled back
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Invalid construction parameters
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using ElevatorError
pub type Result<T> = std::result::Result<T, ElevatorError>;
