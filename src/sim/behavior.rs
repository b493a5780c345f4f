//! Per-entity behaviours
//!
//! Each entity owns exactly one `Behavior` variant, chosen from its kind at
//! spawn. The stepping routine drives it through a fixed interface:
//! `tick` once per step, then `on_enter` / `on_continue` / `on_exit` for the
//! contact lifecycle events touching the entity.

use serde::{Deserialize, Serialize};

use super::EntityId;
use super::fixed::Fixed;
use super::state::{Body, EntityKind, SpawnRequest};
use super::vector::FixedVec3;
use crate::error::ArithmeticError;
use crate::settings::Settings;

/// Read-only view of an entity, taken at the start of the behaviour pass.
///
/// Targeting works on these so every behaviour in a step sees the same world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: FixedVec3,
    pub dead: bool,
}

/// The other side of a contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counterpart {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: FixedVec3,
}

/// Side effect of a contact handler on the other entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Health to take from the counterpart
    pub damage: u32,
}

/// Linear nearest-neighbour scan over live sightings.
///
/// `accept` sees each candidate with its distance from `origin`. Ties go to
/// the lower id. Candidates too far away to measure are skipped.
pub fn nearest<'a>(
    sightings: &'a [Sighting],
    requester: EntityId,
    origin: FixedVec3,
    mut accept: impl FnMut(&Sighting, Fixed) -> bool,
) -> Option<&'a Sighting> {
    let mut best: Option<(&Sighting, Fixed)> = None;
    for sighting in sightings {
        if sighting.id == requester || sighting.dead {
            continue;
        }
        let Ok(distance_sq) = sighting
            .position
            .checked_sub(origin)
            .and_then(FixedVec3::checked_length_squared)
        else {
            continue;
        };
        if !accept(sighting, distance_sq.sqrt()) {
            continue;
        }
        if best.is_none_or(|(_, d)| distance_sq < d) {
            best = Some((sighting, distance_sq));
        }
    }
    best.map(|(sighting, _)| sighting)
}

/// Everything a behaviour may look at or produce during `tick`
pub struct TickContext<'a> {
    pub id: EntityId,
    pub dt: Fixed,
    pub settings: &'a Settings,
    pub sightings: &'a [Sighting],
    /// Spawns requested this step, applied after the despawn pass
    pub spawns: &'a mut Vec<SpawnRequest>,
}

/// Seeking shooter state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerState {
    /// Point the entity orbits around; this is what actually travels
    pub origin: FixedVec3,
    pub orbit_angle: Fixed,
    /// Signed angular speed (radians/second)
    pub orbit_speed: Fixed,
    /// Current offset from `origin`, eased toward the orbit circle
    pub offset: FixedVec3,
    /// Displacement picked up from overlapping other seekers, decays each step
    pub push: FixedVec3,
    pub since_last_shot: Fixed,
    pub target: Option<EntityId>,
}

impl SeekerState {
    pub fn new(origin: FixedVec3, orbit_angle: Fixed, orbit_speed: Fixed) -> Self {
        Self {
            origin,
            orbit_angle,
            orbit_speed,
            offset: FixedVec3::ZERO,
            push: FixedVec3::ZERO,
            since_last_shot: Fixed::ZERO,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Hunts the nearest other seeker while orbiting, shoots periodically
    Seeker(SeekerState),
    /// Bounces away from same-kind bodies it runs into
    Deflector,
    /// Expires on the first hit that is not its shooter
    Projectile { source: Option<EntityId> },
    /// Counts overlaps for presentation; never moves on its own
    Sensor { counter: u32 },
}

impl Behavior {
    /// Advance one step. An error leaves `body` partially updated; the caller
    /// rejects the entity.
    pub fn tick(&mut self, body: &mut Body, ctx: &mut TickContext<'_>) -> Result<(), ArithmeticError> {
        match self {
            Behavior::Deflector | Behavior::Projectile { .. } => drift(body, ctx.dt),
            Behavior::Seeker(state) => seek(state, body, ctx),
            Behavior::Sensor { .. } => Ok(()),
        }
    }

    pub fn on_enter(&mut self, body: &mut Body, other: &Counterpart) -> Result<Reaction, ArithmeticError> {
        match self {
            Behavior::Seeker(_) => {
                if other.kind == EntityKind::Asteroid {
                    body.health = 0;
                }
            }
            Behavior::Deflector => {
                if other.kind == EntityKind::Asteroid {
                    // coincident centres keep their heading
                    let away = body.position.checked_sub(other.position)?;
                    if let Ok(away) = away.checked_normalize() {
                        body.direction = away;
                    }
                }
            }
            Behavior::Projectile { source } => {
                // Sensors only observe; a spent blast hits nothing else this step
                let hits = *source != Some(other.id)
                    && other.kind != EntityKind::Placeholder
                    && !body.dead();
                if hits {
                    body.health = 0;
                    return Ok(Reaction { damage: 1 });
                }
            }
            Behavior::Sensor { counter } => *counter = counter.saturating_add(1),
        }
        Ok(Reaction::default())
    }

    pub fn on_continue(
        &mut self,
        body: &mut Body,
        other: &Counterpart,
        settings: &Settings,
    ) -> Result<(), ArithmeticError> {
        if let Behavior::Seeker(state) = self {
            if other.kind == EntityKind::Ufo {
                let apart = body.position.checked_sub(other.position)?;
                state.push = state
                    .push
                    .checked_add(apart.checked_scale(settings.ufo.push_strength)?)?;
            }
        }
        Ok(())
    }

    pub fn on_exit(&mut self, _body: &mut Body, _other: &Counterpart) {
        if let Behavior::Sensor { counter } = self {
            *counter = counter.saturating_sub(1);
        }
    }

    pub fn is_colliding(&self) -> bool {
        matches!(self, Behavior::Sensor { counter } if *counter > 0)
    }
}

/// Default motion: `position += direction * dt * speed`
fn drift(body: &mut Body, dt: Fixed) -> Result<(), ArithmeticError> {
    let delta = body.direction.checked_scale(dt)?.checked_scale(body.speed)?;
    body.position = body.position.checked_add(delta)?;
    Ok(())
}

fn seek(state: &mut SeekerState, body: &mut Body, ctx: &mut TickContext<'_>) -> Result<(), ArithmeticError> {
    let settings = ctx.settings;
    let tuning = &settings.ufo;

    if state.since_last_shot >= tuning.fire_interval {
        fire(body, ctx)?;
        state.since_last_shot = Fixed::ZERO;
    } else {
        state.since_last_shot = state.since_last_shot.checked_add(ctx.dt)?;
    }

    let sightings = ctx.sightings;
    let cached = state
        .target
        .and_then(|id| sightings.iter().find(|p| p.id == id))
        .filter(|p| !p.dead);
    let target = match cached {
        Some(sighting) => Some(sighting),
        None => nearest(sightings, ctx.id, body.position, |p, _| {
            p.kind == EntityKind::Ufo
        }),
    };
    state.target = target.map(|p| p.id);

    body.direction = match target {
        Some(target) => {
            let diff = target.position.checked_sub(body.position)?;
            let toward = diff.normalize_or_zero();
            let threshold = body.scale.checked_mul(tuning.turn_factor)?;
            if diff.checked_length_squared()? > threshold.checked_mul(threshold)? {
                toward
            } else {
                toward.turn()
            }
        }
        None => FixedVec3::ZERO,
    };

    let travel = body.direction.checked_scale(ctx.dt)?.checked_scale(body.speed)?;
    state.origin = state.origin.checked_add(travel)?;
    state.orbit_angle = state
        .orbit_angle
        .checked_add(state.orbit_speed.checked_mul(ctx.dt)?)?
        .wrap_angle();

    let (sin, cos) = state.orbit_angle.sin_cos();
    let desired = FixedVec3::xy(sin, cos).checked_scale(tuning.orbit_radius)?;
    let pushed = state.offset.checked_add(state.push)?;
    state.offset = FixedVec3::lerp(pushed, desired, tuning.orbit_blend);
    body.position = state.origin.checked_add(state.offset)?;
    state.push = state.push.checked_scale(tuning.push_decay)?;
    Ok(())
}

/// Shoot at the nearest other seeker, or at an asteroid inside the detection
/// radius
fn fire(body: &Body, ctx: &mut TickContext<'_>) -> Result<(), ArithmeticError> {
    let tuning = &ctx.settings.ufo;
    let sightings = ctx.sightings;
    let detection = tuning.diameter.checked_mul(tuning.detection_factor)?;
    let Some(target) = nearest(sightings, ctx.id, body.position, |p, distance| match p.kind {
        EntityKind::Ufo => true,
        EntityKind::Asteroid => distance <= detection,
        _ => false,
    }) else {
        return Ok(());
    };

    let Ok(aim) = target.position.checked_sub(body.position)?.checked_normalize() else {
        return Ok(());
    };
    let muzzle = body.position.checked_add(aim)?;
    log::trace!("Entity {} fires at {} from {:?}", ctx.id, target.id, muzzle);
    ctx.spawns.push(SpawnRequest::blast(muzzle, aim, ctx.id));
    Ok(())
}
