//! Simulation settings
//!
//! Loaded from JSON on native builds. Fixed-point values are written as
//! decimal strings (`"1.5"`) so they parse exactly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::SettingsError;
use crate::sim::fixed::{Fixed, decimal};

/// What to do when a fixed-capacity grid cell or the contact slab is full.
///
/// Both policies record an `EngineFault` in the step report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Accept the insertion anyway, growing past the nominal capacity
    #[default]
    Grow,
    /// Refuse the insertion
    Reject,
}

impl CapacityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityPolicy::Grow => "grow",
            CapacityPolicy::Reject => "reject",
        }
    }
}

/// Asteroid field tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidSettings {
    /// Asteroids spawned by `World::populate`
    pub count: u32,
    #[serde(with = "decimal")]
    pub min_scale: Fixed,
    #[serde(with = "decimal")]
    pub max_scale: Fixed,
    #[serde(with = "decimal")]
    pub speed: Fixed,
    pub health: u32,
}

impl Default for AsteroidSettings {
    fn default() -> Self {
        Self {
            count: 15,
            min_scale: Fixed::ONE,
            max_scale: Fixed::from_ratio(3, 2),
            speed: Fixed::HALF,
            health: consts::ASTEROID_HEALTH,
        }
    }
}

/// UFO (seeking shooter) tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoSettings {
    #[serde(with = "decimal")]
    pub diameter: Fixed,
    #[serde(with = "decimal")]
    pub speed: Fixed,
    pub health: u32,
    /// Asteroids are considered targets within `diameter * detection_factor`
    #[serde(with = "decimal")]
    pub detection_factor: Fixed,
    /// Seconds between shots
    #[serde(with = "decimal")]
    pub fire_interval: Fixed,
    /// Magnitude of the orbit angular speed (radians/second); sign is random
    #[serde(with = "decimal")]
    pub orbit_speed: Fixed,
    #[serde(with = "decimal")]
    pub orbit_radius: Fixed,
    /// Steer toward the target while farther than `scale * turn_factor`
    #[serde(with = "decimal")]
    pub turn_factor: Fixed,
    /// Per-step blend of the orbit offset toward the desired orbit point
    #[serde(with = "decimal")]
    pub orbit_blend: Fixed,
    /// Per-step decay of the contact push impulse (< 1)
    #[serde(with = "decimal")]
    pub push_decay: Fixed,
    /// Push impulse gained per step of contact with another UFO
    #[serde(with = "decimal")]
    pub push_strength: Fixed,
}

impl Default for UfoSettings {
    fn default() -> Self {
        Self {
            diameter: Fixed::ONE,
            speed: Fixed::HALF,
            health: consts::UFO_HEALTH,
            detection_factor: Fixed::from_int(5),
            fire_interval: Fixed::from_int(2),
            orbit_speed: Fixed::TAU,
            orbit_radius: Fixed::ONE,
            turn_factor: Fixed::from_int(2),
            orbit_blend: Fixed::from_ratio(1, 10),
            push_decay: Fixed::from_ratio(97, 100),
            push_strength: Fixed::from_ratio(1, 40),
        }
    }
}

/// Projectile tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastSettings {
    #[serde(with = "decimal")]
    pub speed: Fixed,
    /// Half extent along the heading
    #[serde(with = "decimal")]
    pub half_length: Fixed,
    /// Half extent across the heading
    #[serde(with = "decimal")]
    pub half_thickness: Fixed,
}

impl Default for BlastSettings {
    fn default() -> Self {
        Self {
            speed: Fixed::from_int(4),
            half_length: Fixed::from_ratio(1, 5),
            half_thickness: Fixed::from_ratio(1, 20),
        }
    }
}

/// Complete simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Scene ===
    #[serde(with = "decimal")]
    pub scene_width: Fixed,
    #[serde(with = "decimal")]
    pub scene_height: Fixed,
    /// Margin outside the scene before an entity is despawned
    #[serde(with = "decimal")]
    pub boundary: Fixed,
    /// Fixed timestep in seconds
    #[serde(with = "decimal")]
    pub dt: Fixed,

    // === Broad phase / contacts ===
    /// Cells per axis
    pub grid_size: u32,
    /// Nominal bodies per cell
    pub cell_capacity: usize,
    /// Nominal simultaneous contacts
    pub contact_capacity: usize,
    pub capacity_policy: CapacityPolicy,

    // === Entities ===
    pub asteroids: AsteroidSettings,
    pub ufo: UfoSettings,
    pub blast: BlastSettings,
    #[serde(with = "decimal")]
    pub sensor_radius: Fixed,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scene_width: Fixed::from_int(consts::SCENE_WIDTH),
            scene_height: Fixed::from_int(consts::SCENE_HEIGHT),
            boundary: Fixed::from_int(consts::BOUNDARY),
            dt: consts::SIM_DT,

            grid_size: consts::GRID_SIZE,
            cell_capacity: consts::CELL_CAPACITY,
            contact_capacity: consts::CONTACT_CAPACITY,
            capacity_policy: CapacityPolicy::Grow,

            asteroids: AsteroidSettings::default(),
            ufo: UfoSettings::default(),
            blast: BlastSettings::default(),
            sensor_radius: Fixed::from_ratio(1, 4),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Cell extent per axis
    pub fn cell_size(&self) -> (Fixed, Fixed) {
        let n = Fixed::from_int(self.grid_size.min(i32::MAX as u32) as i32);
        (self.scene_width / n, self.scene_height / n)
    }

    /// Largest collision radius any spawnable entity can have
    pub fn max_collision_radius(&self) -> Fixed {
        let asteroid = self.asteroids.max_scale * Fixed::HALF;
        let ufo = self.ufo.diameter * Fixed::HALF;
        let blast = (self.blast.half_length * self.blast.half_length
            + self.blast.half_thickness * self.blast.half_thickness)
            .sqrt();
        asteroid.max(ufo).max(blast).max(self.sensor_radius)
    }

    /// Reject unusable values. A grid whose cells are narrower than the
    /// largest collision diameter only logs a warning: pairs more than one
    /// cell apart can then be missed.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));

        if self.scene_width <= Fixed::ZERO || self.scene_height <= Fixed::ZERO {
            return invalid("scene dimensions must be positive");
        }
        if self.boundary < Fixed::ZERO {
            return invalid("boundary must not be negative");
        }
        if self.dt <= Fixed::ZERO {
            return invalid("dt must be positive");
        }
        if self.grid_size == 0 || self.grid_size > i32::MAX as u32 {
            return invalid("grid_size must be positive");
        }
        if self.cell_capacity == 0 || self.contact_capacity == 0 {
            return invalid("capacities must be positive");
        }
        if self.asteroids.min_scale <= Fixed::ZERO
            || self.asteroids.min_scale > self.asteroids.max_scale
        {
            return invalid("asteroid scale range must be positive and ordered");
        }
        if self.ufo.push_decay >= Fixed::ONE || self.ufo.push_decay < Fixed::ZERO {
            return invalid("ufo push_decay must be in [0, 1)");
        }

        let (cell_w, cell_h) = self.cell_size();
        let diameter = self.max_collision_radius() * Fixed::from_int(2);
        if cell_w < diameter || cell_h < diameter {
            log::warn!(
                "Grid cells {}x{} are smaller than the largest collision diameter {}; \
                 overlapping pairs may be missed",
                cell_w,
                cell_h,
                diameter
            );
        }
        Ok(())
    }
}
