//! World state and core simulation types
//!
//! The world owns every entity, the broad-phase grid and the contact ledger.
//! Nothing here is global; the stepping routine in `tick` borrows the world
//! exclusively for the duration of a step.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::behavior::{self, Behavior, Counterpart, SeekerState, Sighting};
use super::contacts::{Contact, ContactLedger};
use super::fixed::Fixed;
use super::grid::Grid;
use super::snapshot::{EntitySnapshot, Snapshot};
use super::vector::FixedVec3;
use super::volume::{Layer, LayerMask, Volume};
use crate::consts;
use crate::error::SimError;
use crate::settings::Settings;

/// Stable entity identifier. Allocated monotonically, never reused.
pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Seeking shooter
    Ufo,
    Asteroid,
    /// Projectile fired by a UFO
    Blast,
    /// Pointer-driven sensor
    Placeholder,
}

impl EntityKind {
    pub fn layer(self) -> Layer {
        match self {
            EntityKind::Ufo => Layer::UFO,
            EntityKind::Asteroid => Layer::ASTEROID,
            EntityKind::Blast => Layer::BLAST,
            EntityKind::Placeholder => Layer::SENSOR,
        }
    }

    pub fn mask(self) -> LayerMask {
        let bodies = LayerMask::NONE.with(Layer::UFO).with(Layer::ASTEROID);
        match self {
            EntityKind::Ufo | EntityKind::Asteroid | EntityKind::Blast => bodies,
            EntityKind::Placeholder => LayerMask::ALL,
        }
    }

    /// Sensors are never damaged by projectiles
    pub fn takes_damage(self) -> bool {
        self != EntityKind::Placeholder
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Ufo => "ufo",
            EntityKind::Asteroid => "asteroid",
            EntityKind::Blast => "blast",
            EntityKind::Placeholder => "placeholder",
        }
    }
}

/// Kinematic and collision state shared by every kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub kind: EntityKind,
    pub position: FixedVec3,
    pub direction: FixedVec3,
    pub speed: Fixed,
    pub scale: Fixed,
    pub angle: Fixed,
    pub health: u32,
    pub volume: Volume,
}

impl Body {
    pub fn dead(&self) -> bool {
        self.health < 1
    }

    /// Copy position into the owned volume (and heading, for boxes)
    pub fn sync_volume(&mut self) {
        self.volume.position = self.position;
        self.volume.set_angle(self.angle);
    }
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub behavior: Behavior,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind
    }

    pub fn position(&self) -> FixedVec3 {
        self.body.position
    }

    pub fn dead(&self) -> bool {
        self.body.dead()
    }

    pub fn is_colliding(&self) -> bool {
        self.behavior.is_colliding()
    }

    pub fn sighting(&self) -> Sighting {
        Sighting {
            id: self.id,
            kind: self.body.kind,
            position: self.body.position,
            dead: self.dead(),
        }
    }

    pub fn counterpart(&self) -> Counterpart {
        Counterpart {
            id: self.id,
            kind: self.body.kind,
            position: self.body.position,
        }
    }
}

/// Optional spawn parameters; unset values come from `Settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnParams {
    /// Heading; an asteroid with a zero heading gets a random one
    pub direction: FixedVec3,
    pub speed: Option<Fixed>,
    /// Diameter for circular kinds
    pub scale: Option<Fixed>,
    /// Shooter of a blast
    pub source: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: EntityKind,
    pub position: FixedVec3,
    pub params: SpawnParams,
}

impl SpawnRequest {
    pub fn new(kind: EntityKind, position: FixedVec3) -> Self {
        Self {
            kind,
            position,
            params: SpawnParams::default(),
        }
    }

    pub fn asteroid(position: FixedVec3, direction: FixedVec3) -> Self {
        let mut request = Self::new(EntityKind::Asteroid, position);
        request.params.direction = direction;
        request
    }

    pub fn ufo(position: FixedVec3) -> Self {
        Self::new(EntityKind::Ufo, position)
    }

    pub fn blast(position: FixedVec3, direction: FixedVec3, source: EntityId) -> Self {
        let mut request = Self::new(EntityKind::Blast, position);
        request.params.direction = direction;
        request.params.source = Some(source);
        request
    }

    pub fn placeholder(position: FixedVec3) -> Self {
        Self::new(EntityKind::Placeholder, position)
    }

    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.params.speed = Some(speed);
        self
    }

    pub fn with_scale(mut self, scale: Fixed) -> Self {
        self.params.scale = Some(scale);
        self
    }
}

/// Uniform draw from `[low, high)`; `low` when the range is empty
fn random_fixed(rng: &mut Pcg32, low: Fixed, high: Fixed) -> Fixed {
    if high <= low {
        return low;
    }
    Fixed::from_raw(rng.random_range(low.raw()..high.raw()))
}

/// Complete simulation state (deterministic for a given seed and input
/// sequence)
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) settings: Settings,
    seed: u64,
    rng: Pcg32,
    /// Steps taken
    pub(crate) tick: u64,
    next_id: EntityId,
    /// Sorted by id
    pub(crate) entities: Vec<Entity>,
    pub(crate) grid: Grid,
    pub(crate) ledger: ContactLedger,
}

impl World {
    /// Create an empty world. Fails when `settings` do not validate.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SimError> {
        settings.validate()?;
        let grid = Grid::new(
            settings.scene_width,
            settings.scene_height,
            settings.grid_size,
            settings.cell_capacity,
            settings.capacity_policy,
        );
        let ledger = ContactLedger::new(settings.contact_capacity, settings.capacity_policy);
        log::info!(
            "World created: seed {}, {}x{} scene, {}x{} grid, {} contact slots ({} policy)",
            seed,
            settings.scene_width,
            settings.scene_height,
            settings.grid_size,
            settings.grid_size,
            settings.contact_capacity,
            settings.capacity_policy.as_str()
        );
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            tick: 0,
            next_id: 1,
            entities: Vec::new(),
            grid,
            ledger,
            settings,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Live contacts
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.ledger.iter()
    }

    /// Entities in id order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub(crate) fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Allocate an entity and its volume. The new entity takes part in
    /// collisions from the next grid rebuild on.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<EntityId, SimError> {
        let SpawnRequest {
            kind,
            position,
            params,
        } = request;
        if params.scale.is_some_and(|s| s <= Fixed::ZERO) {
            return Err(SimError::InvalidSpawn(format!(
                "{} scale must be positive",
                kind.as_str()
            )));
        }
        if params.speed.is_some_and(Fixed::is_negative) {
            return Err(SimError::InvalidSpawn(format!(
                "{} speed must not be negative",
                kind.as_str()
            )));
        }

        let id = self.next_id;
        let (body, behavior) = match kind {
            EntityKind::Asteroid => self.asteroid(position, &params)?,
            EntityKind::Ufo => self.ufo(position, &params)?,
            EntityKind::Blast => self.blast(position, &params)?,
            EntityKind::Placeholder => self.placeholder(position, &params)?,
        };
        self.next_id = self.next_id.checked_add(1).ok_or_else(|| {
            SimError::InvalidSpawn("entity ids exhausted".to_string())
        })?;

        log::debug!("Spawned {} {} at {:?}", kind.as_str(), id, position);
        // ids only grow, so pushing keeps the table sorted
        self.entities.push(Entity { id, body, behavior });
        Ok(id)
    }

    fn body(&self, kind: EntityKind, position: FixedVec3, scale: Fixed, health: u32) -> Result<Body, SimError> {
        let radius = scale.checked_mul(Fixed::HALF)?;
        Ok(Body {
            kind,
            position,
            direction: FixedVec3::ZERO,
            speed: Fixed::ZERO,
            scale,
            angle: Fixed::ZERO,
            health,
            volume: Volume::circle(radius, position, kind.layer(), kind.mask()),
        })
    }

    fn asteroid(&mut self, position: FixedVec3, params: &SpawnParams) -> Result<(Body, Behavior), SimError> {
        let tuning = &self.settings.asteroids;
        let (min_scale, max_scale, speed, health) =
            (tuning.min_scale, tuning.max_scale, tuning.speed, tuning.health);

        let scale = match params.scale {
            Some(scale) => scale,
            None => random_fixed(&mut self.rng, min_scale, max_scale),
        };
        let direction = match params.direction.checked_normalize() {
            Ok(direction) => direction,
            Err(_) => FixedVec3::from_angle(random_fixed(&mut self.rng, Fixed::ZERO, Fixed::TAU)),
        };

        let mut body = self.body(EntityKind::Asteroid, position, scale, health)?;
        body.direction = direction;
        body.speed = params.speed.unwrap_or(speed);
        Ok((body, Behavior::Deflector))
    }

    fn ufo(&mut self, position: FixedVec3, params: &SpawnParams) -> Result<(Body, Behavior), SimError> {
        let tuning = &self.settings.ufo;
        let (diameter, speed, health, orbit_speed) =
            (tuning.diameter, tuning.speed, tuning.health, tuning.orbit_speed);

        let orbit_angle = random_fixed(&mut self.rng, Fixed::ZERO, Fixed::TAU);
        let orbit_speed = if self.rng.random::<bool>() {
            orbit_speed
        } else {
            orbit_speed.checked_neg()?
        };

        let mut body = self.body(EntityKind::Ufo, position, params.scale.unwrap_or(diameter), health)?;
        body.speed = params.speed.unwrap_or(speed);
        let state = SeekerState::new(position, orbit_angle, orbit_speed);
        Ok((body, Behavior::Seeker(state)))
    }

    fn blast(&mut self, position: FixedVec3, params: &SpawnParams) -> Result<(Body, Behavior), SimError> {
        let direction = params.direction.checked_normalize().map_err(|_| {
            SimError::InvalidSpawn("blast needs a non-zero direction".to_string())
        })?;
        let tuning = &self.settings.blast;
        let angle = direction.angle();

        let body = Body {
            kind: EntityKind::Blast,
            position,
            direction,
            speed: params.speed.unwrap_or(tuning.speed),
            scale: tuning.half_length.checked_mul(Fixed::from_int(2))?,
            angle,
            health: consts::BLAST_HEALTH,
            volume: Volume::oriented_box(
                tuning.half_length,
                tuning.half_thickness,
                angle,
                position,
                EntityKind::Blast.layer(),
                EntityKind::Blast.mask(),
            ),
        };
        Ok((body, Behavior::Projectile { source: params.source }))
    }

    fn placeholder(&mut self, position: FixedVec3, params: &SpawnParams) -> Result<(Body, Behavior), SimError> {
        let scale = match params.scale {
            Some(scale) => scale,
            None => self.settings.sensor_radius.checked_mul(Fixed::from_int(2))?,
        };
        let body = self.body(EntityKind::Placeholder, position, scale, consts::PLACEHOLDER_HEALTH)?;
        Ok((body, Behavior::Sensor { counter: 0 }))
    }

    /// Spawn the configured asteroid field at random positions in the scene
    pub fn populate(&mut self) -> Result<Vec<EntityId>, SimError> {
        let count = self.settings.asteroids.count;
        let (width, height) = (self.settings.scene_width, self.settings.scene_height);
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let x = random_fixed(&mut self.rng, Fixed::ZERO, width);
            let y = random_fixed(&mut self.rng, Fixed::ZERO, height);
            ids.push(self.spawn(SpawnRequest::asteroid(FixedVec3::xy(x, y), FixedVec3::ZERO))?);
        }
        log::info!("Populated {} asteroids", ids.len());
        Ok(ids)
    }

    /// Point-in-time sightings of every entity, in id order
    pub fn sightings(&self) -> Vec<Sighting> {
        self.entities.iter().map(Entity::sighting).collect()
    }

    /// Nearest live entity to `requester` accepted by `predicate`, which is
    /// given each candidate and its distance. O(n).
    pub fn find_nearest(
        &self,
        requester: EntityId,
        predicate: impl FnMut(&Sighting, Fixed) -> bool,
    ) -> Result<Option<EntityId>, SimError> {
        let origin = self
            .entity(requester)
            .ok_or(SimError::UnknownEntity(requester))?
            .position();
        let sightings = self.sightings();
        Ok(behavior::nearest(&sightings, requester, origin, predicate).map(|p| p.id))
    }

    /// Whether `position` has left `[-boundary, dimension + boundary]` on
    /// either axis
    pub fn out_of_bounds(&self, position: FixedVec3) -> bool {
        let margin = self.settings.boundary;
        let low = -margin;
        position.x < low
            || position.y < low
            || position.x > self.settings.scene_width.saturating_add(margin)
            || position.y > self.settings.scene_height.saturating_add(margin)
    }

    /// Presentation view of every live entity
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            entities: self
                .entities
                .iter()
                .map(|e| EntitySnapshot {
                    id: e.id,
                    kind: e.kind(),
                    position: e.body.position,
                    angle: e.body.angle,
                    colliding: e.is_colliding(),
                    tile: e.body.volume.occupied_tile,
                    health: e.body.health,
                })
                .collect(),
        }
    }
}
