//! Deterministic simulation module
//!
//! All arena logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Fixed-point arithmetic only (no floats on the simulation path)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod collision;
pub mod contacts;
pub mod fixed;
pub mod grid;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod vector;
pub mod volume;

pub use behavior::{Behavior, SeekerState, Sighting};
pub use collision::{box_vs_circle, circle_vs_circle, overlaps};
pub use contacts::{Contact, ContactEvent, ContactEventKind, ContactLedger};
pub use fixed::Fixed;
pub use grid::Grid;
pub use snapshot::{EntitySnapshot, Snapshot};
pub use state::{Body, Entity, EntityId, EntityKind, SpawnParams, SpawnRequest, World};
pub use tick::{DespawnReason, Despawned, StepInput, StepReport, tick};
pub use vector::FixedVec3;
pub use volume::{Layer, LayerMask, Shape, Tile, Volume};
