//! Per-step presentation snapshot
//!
//! Read-only view handed to whatever draws the scene. Fixed-point values are
//! kept exact; `render_*` helpers convert to `glam` floats for drawing only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::fixed::Fixed;
use super::state::EntityKind;
use super::vector::FixedVec3;
use super::volume::Tile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: FixedVec3,
    pub angle: Fixed,
    /// Sensor overlap flag
    pub colliding: bool,
    /// Primary grid tile from the last rebuild
    pub tile: Option<Tile>,
    pub health: u32,
}

impl EntitySnapshot {
    pub fn render_position(&self) -> Vec2 {
        self.position.truncate()
    }

    pub fn render_angle(&self) -> f32 {
        self.angle.to_f32()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    /// In id order
    pub entities: Vec<EntitySnapshot>,
}

impl Snapshot {
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}
