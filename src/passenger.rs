//! Passenger records and the fixed kind/weight table

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::floor::FloorId;

/// Passenger size class.
///
/// The wire codes (0..=3) and per-kind weights are a fixed contract with the
/// request producers; new kinds are not added at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerKind {
    /// Code 0, weight 3
    Small,
    /// Code 1, weight 14
    Large,
    /// Code 2, weight 10
    Medium,
    /// Code 3, weight 16
    ExtraLarge,
}

impl PassengerKind {
    /// Parse a wire code. Returns `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Small),
            1 => Some(Self::Large),
            2 => Some(Self::Medium),
            3 => Some(Self::ExtraLarge),
            _ => None,
        }
    }

    /// The wire code for this kind
    pub fn code(&self) -> u8 {
        match self {
            Self::Small => 0,
            Self::Large => 1,
            Self::Medium => 2,
            Self::ExtraLarge => 3,
        }
    }

    /// Fixed weight lookup
    pub fn weight(&self) -> u32 {
        match self {
            Self::Small => 3,
            Self::Large => 14,
            Self::Medium => 10,
            Self::ExtraLarge => 16,
        }
    }

    /// All kinds, in wire-code order
    pub const ALL: [Self; 4] = [Self::Small, Self::Large, Self::Medium, Self::ExtraLarge];

    /// The heaviest weight any kind can have.
    ///
    /// Used by config validation: a cabin whose maximum load is below this
    /// could be handed a passenger it can never admit, stalling boarding at
    /// its floor.
    pub fn heaviest() -> u32 {
        Self::ALL.iter().map(|k| k.weight()).fold(0, u32::max)
    }
}

/// One transport request unit.
///
/// Immutable once created. A passenger is owned by exactly one container at
/// a time (a floor queue or the cabin) and is moved, never copied, between
/// them. It is dropped when dispensed at its destination or discarded during
/// shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    id: Uuid,
    kind: PassengerKind,
    origin: FloorId,
    destination: FloorId,
}

impl Passenger {
    /// Create a new passenger with a generated id.
    ///
    /// Floor validation happens at the `issue_request` boundary; this
    /// constructor trusts its arguments.
    pub fn new(kind: PassengerKind, origin: FloorId, destination: FloorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            origin,
            destination,
        }
    }

    /// Unique id, used for event and log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> PassengerKind {
        self.kind
    }

    pub fn origin(&self) -> FloorId {
        self.origin
    }

    pub fn destination(&self) -> FloorId {
        self.destination
    }

    /// Weight, derived solely from the kind
    pub fn weight(&self) -> u32 {
        self.kind.weight()
    }
}
