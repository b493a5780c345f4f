//! Arena Sim - deterministic fixed-point arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fixed-point math, broad/narrow phase,
//!   contact ledger, entity behaviours)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Arithmetic errors, engine faults and API errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ArithmeticError, EngineFault, SettingsError, SimError};
pub use settings::{CapacityPolicy, Settings};
pub use sim::{EntityId, EntityKind, Fixed, FixedVec3, StepInput, StepReport, World};

/// Simulation defaults
pub mod consts {
    use crate::sim::fixed::Fixed;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: Fixed = Fixed::from_ratio(1, 60);
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Scene dimensions
    pub const SCENE_WIDTH: i32 = 18;
    pub const SCENE_HEIGHT: i32 = 10;
    /// Margin past the scene edge before despawn
    pub const BOUNDARY: i32 = 1;

    /// Broad phase: cells per axis (3 x 1.67 cells fit a 1.5 diameter)
    pub const GRID_SIZE: u32 = 6;
    /// Nominal bodies per cell
    pub const CELL_CAPACITY: usize = 16;
    /// Nominal simultaneous contacts
    pub const CONTACT_CAPACITY: usize = 32;

    /// Starting health per kind
    pub const UFO_HEALTH: u32 = 20;
    pub const ASTEROID_HEALTH: u32 = 3;
    pub const BLAST_HEALTH: u32 = 1;
    pub const PLACEHOLDER_HEALTH: u32 = 1;
}
