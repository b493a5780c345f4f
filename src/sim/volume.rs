//! Collision volumes owned by entities

use serde::{Deserialize, Serialize};

use super::fixed::Fixed;
use super::vector::FixedVec3;

/// Collision layer index (0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    pub const COUNT: u8 = 32;

    pub const UFO: Self = Self(0);
    pub const ASTEROID: Self = Self(1);
    pub const BLAST: Self = Self(2);
    pub const SENSOR: Self = Self(3);

    /// `None` when `index` is not below `Layer::COUNT`
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    const fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Set of layers a volume reacts to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer.bit())
    }

    pub const fn without(self, layer: Layer) -> Self {
        Self(self.0 & !layer.bit())
    }

    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }
}

/// Shape of a collision volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        radius: Fixed,
    },
    /// Rectangle rotated by `angle` around the volume position
    OrientedBox {
        half_width: Fixed,
        half_height: Fixed,
        angle: Fixed,
    },
}

impl Shape {
    /// Radius of the smallest circle around the volume position that contains
    /// the shape
    pub fn bounding_radius(&self) -> Fixed {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::OrientedBox {
                half_width,
                half_height,
                ..
            } => (half_width * half_width + half_height * half_height).sqrt(),
        }
    }
}

/// Grid tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
}

/// A collision volume. Exclusively owned by its entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub shape: Shape,
    pub position: FixedVec3,
    pub layer: Layer,
    pub mask: LayerMask,
    /// Primary tile from the last grid rebuild; `None` when outside the grid
    pub occupied_tile: Option<Tile>,
}

impl Volume {
    pub fn new(shape: Shape, position: FixedVec3, layer: Layer, mask: LayerMask) -> Self {
        Self {
            shape,
            position,
            layer,
            mask,
            occupied_tile: None,
        }
    }

    pub fn circle(radius: Fixed, position: FixedVec3, layer: Layer, mask: LayerMask) -> Self {
        Self::new(Shape::Circle { radius }, position, layer, mask)
    }

    pub fn oriented_box(
        half_width: Fixed,
        half_height: Fixed,
        angle: Fixed,
        position: FixedVec3,
        layer: Layer,
        mask: LayerMask,
    ) -> Self {
        Self::new(
            Shape::OrientedBox {
                half_width,
                half_height,
                angle,
            },
            position,
            layer,
            mask,
        )
    }

    /// Whether this volume and `other` should be narrow-phase tested.
    ///
    /// Either side listing the other's layer is enough.
    pub fn interacts_with(&self, other: &Volume) -> bool {
        self.mask.contains(other.layer) || other.mask.contains(self.layer)
    }

    /// Keep an oriented box aligned with its owner's heading
    pub fn set_angle(&mut self, new_angle: Fixed) {
        if let Shape::OrientedBox { angle, .. } = &mut self.shape {
            *angle = new_angle;
        }
    }
}
