//! Error and fault types
//!
//! Faults are recoverable at the engine level: they are recorded in the step
//! report and the step keeps going. Only the fallible API surface returns
//! `SimError`.

use std::fmt;

use crate::sim::EntityId;

/// Failure of a checked fixed-point operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    /// Result does not fit the backing integer
    Overflow,
    /// Division (or normalization) by zero
    DivideByZero,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "fixed-point overflow"),
            Self::DivideByZero => write!(f, "fixed-point division by zero"),
        }
    }
}

impl std::error::Error for ArithmeticError {}

/// A sizing or numeric condition surfaced during a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    /// More bodies mapped into a grid cell than its capacity
    GridCellExhausted {
        cell: (u32, u32),
        capacity: usize,
        entity: EntityId,
    },
    /// More simultaneous contacts than the slab holds
    ContactSlabExhausted {
        capacity: usize,
        first: EntityId,
        second: EntityId,
    },
    /// An entity's integration overflowed and was rejected
    Arithmetic {
        entity: EntityId,
        error: ArithmeticError,
    },
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridCellExhausted {
                cell,
                capacity,
                entity,
            } => write!(
                f,
                "grid cell ({}, {}) exhausted at capacity {capacity} while inserting entity {entity}",
                cell.0, cell.1
            ),
            Self::ContactSlabExhausted {
                capacity,
                first,
                second,
            } => write!(
                f,
                "contact slab exhausted at capacity {capacity} for pair ({first}, {second})"
            ),
            Self::Arithmetic { entity, error } => {
                write!(f, "entity {entity} integration rejected: {error}")
            }
        }
    }
}

impl std::error::Error for EngineFault {}

/// Errors returned by the world API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    UnknownEntity(EntityId),
    Arithmetic(ArithmeticError),
    /// A spawn request that cannot produce a valid entity
    InvalidSpawn(String),
    /// A step fault escalated by a caller that treats faults as errors
    Fault(EngineFault),
    InvalidSettings(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(id) => write!(f, "unknown entity {id}"),
            Self::Arithmetic(e) => write!(f, "{e}"),
            Self::InvalidSpawn(msg) => write!(f, "invalid spawn request: {msg}"),
            Self::Fault(fault) => write!(f, "{fault}"),
            Self::InvalidSettings(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Arithmetic(e) => Some(e),
            Self::Fault(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineFault> for SimError {
    fn from(e: EngineFault) -> Self {
        Self::Fault(e)
    }
}

impl From<ArithmeticError> for SimError {
    fn from(e: ArithmeticError) -> Self {
        Self::Arithmetic(e)
    }
}

/// Errors while loading or validating settings
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read settings: {e}"),
            Self::Parse(e) => write!(f, "failed to parse settings: {e}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<SettingsError> for SimError {
    fn from(e: SettingsError) -> Self {
        Self::InvalidSettings(e.to_string())
    }
}
