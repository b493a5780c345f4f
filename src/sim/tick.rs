//! Fixed timestep simulation step
//!
//! Advances the world deterministically. Phase order within a step:
//! 1. external input (pointer position, spawn requests)
//! 2. behaviour pass (movement, targeting, firing)
//! 3. grid rebuild
//! 4. narrow phase over grid neighbourhoods, contact confirmation
//! 5. lifecycle dispatch: Enter, then Continue / Exit
//! 6. despawn pass (health or bounds), releasing the dying entities' contacts
//! 7. spawns requested by behaviours

use serde::{Deserialize, Serialize};

use super::EntityId;
use super::behavior::{Reaction, TickContext};
use super::collision;
use super::contacts::{Confirmation, ContactEvent, ContactEventKind};
use super::fixed::Fixed;
use super::state::{Entity, EntityKind, SpawnRequest, World};
use super::vector::FixedVec3;
use crate::error::{ArithmeticError, EngineFault, SimError};
use crate::settings::Settings;

/// External input for a single step (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    /// Where sensor entities should sit this step
    pub pointer: Option<FixedVec3>,
    /// Spawned before the behaviour pass
    pub spawns: Vec<SpawnRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnReason {
    /// Health dropped below one
    Destroyed,
    /// Left the scene plus its boundary margin
    OutOfBounds,
    /// Integration overflowed
    Fault,
}

/// An entity removed this step, with enough to play an exit animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Despawned {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: FixedVec3,
    pub reason: DespawnReason,
}

/// What happened during one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub tick: u64,
    pub spawned: Vec<EntityId>,
    pub despawned: Vec<Despawned>,
    /// Lifecycle events in dispatch order
    pub events: Vec<ContactEvent>,
    pub faults: Vec<EngineFault>,
    /// Spawn requests that could not be honoured
    pub rejected: Vec<SimError>,
}

impl StepReport {
    pub fn count(&self, kind: ContactEventKind, a: EntityId, b: EntityId) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == kind && e.involves(a) && e.involves(b))
            .count()
    }

    /// Escalate the first fault, for callers that treat sizing problems as
    /// errors
    pub fn check(&self) -> Result<(), SimError> {
        match self.faults.first() {
            Some(fault) => Err(SimError::Fault(fault.clone())),
            None => Ok(()),
        }
    }
}

impl World {
    /// Advance by the configured timestep
    pub fn step(&mut self, input: &StepInput) -> StepReport {
        let dt = self.settings.dt;
        tick(self, input, dt)
    }
}

/// Advance the world by one timestep
pub fn tick(world: &mut World, input: &StepInput, dt: Fixed) -> StepReport {
    world.tick += 1;
    let mut report = StepReport {
        tick: world.tick,
        ..Default::default()
    };

    // External input
    for request in &input.spawns {
        spawn_into(world, request.clone(), &mut report);
    }
    if let Some(pointer) = input.pointer {
        for entity in &mut world.entities {
            if entity.kind() == EntityKind::Placeholder {
                entity.body.position = pointer;
            }
        }
    }

    // Behaviours
    let sightings = world.sightings();
    let mut requested = Vec::new();
    let mut faulted = Vec::new();
    for entity in &mut world.entities {
        let mut ctx = TickContext {
            id: entity.id,
            dt,
            settings: &world.settings,
            sightings: &sightings,
            spawns: &mut requested,
        };
        if let Err(error) = entity.behavior.tick(&mut entity.body, &mut ctx) {
            log::warn!("Entity {} rejected: {}", entity.id, error);
            report.faults.push(EngineFault::Arithmetic {
                entity: entity.id,
                error,
            });
            faulted.push(entity.id);
            // Half-updated bodies stay out of the broad phase
            entity.body.volume.occupied_tile = None;
            continue;
        }
        entity.body.sync_volume();
    }

    // Broad phase
    world.grid.rebuild(
        world
            .entities
            .iter_mut()
            .filter(|e| !faulted.contains(&e.id))
            .map(|e| (e.id, &mut e.body.volume)),
        &mut report.faults,
    );
    let pairs = world.grid.candidate_pairs(
        world
            .entities
            .iter()
            .map(|e| (e.id, e.body.volume.occupied_tile)),
    );

    // Narrow phase
    world.ledger.begin_step();
    let mut events = Vec::new();
    for (a, b) in pairs {
        let (Some(ia), Some(ib)) = (world.index_of(a), world.index_of(b)) else {
            continue;
        };
        let (va, vb) = (&world.entities[ia].body.volume, &world.entities[ib].body.volume);
        if !va.interacts_with(vb) || !collision::overlaps(va, vb) {
            continue;
        }

        let enter = ContactEvent {
            kind: ContactEventKind::Enter,
            first: a,
            second: b,
        };
        let exhausted = EngineFault::ContactSlabExhausted {
            capacity: world.ledger.capacity(),
            first: a,
            second: b,
        };
        match world.ledger.confirm(a, b) {
            Confirmation::Reconfirmed => {}
            Confirmation::Entered => events.push(enter),
            Confirmation::EnteredOverCapacity => {
                report.faults.push(exhausted);
                events.push(enter);
            }
            Confirmation::Rejected => report.faults.push(exhausted),
        }
    }
    events.extend(world.ledger.end_step());

    for event in &events {
        dispatch(&mut world.entities, &world.settings, event, &mut report.faults, &mut faulted);
    }
    report.events = events;

    // Despawn
    let dying: Vec<(EntityId, DespawnReason)> = world
        .entities
        .iter()
        .filter_map(|e| {
            let reason = if faulted.contains(&e.id) {
                DespawnReason::Fault
            } else if e.dead() {
                DespawnReason::Destroyed
            } else if world.out_of_bounds(e.position()) {
                DespawnReason::OutOfBounds
            } else {
                return None;
            };
            Some((e.id, reason))
        })
        .collect();

    if !dying.is_empty() {
        let mut exits = Vec::new();
        for &(id, _) in &dying {
            exits.extend(world.ledger.release(id));
        }
        for event in &exits {
            dispatch(&mut world.entities, &world.settings, event, &mut report.faults, &mut faulted);
        }
        report.events.extend(exits);

        for &(id, reason) in &dying {
            if let Some(entity) = world.entity(id) {
                log::debug!("Despawned {} {} ({:?})", entity.kind().as_str(), id, reason);
                report.despawned.push(Despawned {
                    id,
                    kind: entity.kind(),
                    position: entity.position(),
                    reason,
                });
            }
        }
        // dying is in id order
        world
            .entities
            .retain(|e| dying.binary_search_by_key(&e.id, |&(id, _)| id).is_err());
    }

    // Behaviour spawns
    for request in requested {
        spawn_into(world, request, &mut report);
    }

    if !report.faults.is_empty() {
        log::warn!("Step {}: {} faults", report.tick, report.faults.len());
    }
    report
}

fn spawn_into(world: &mut World, request: SpawnRequest, report: &mut StepReport) {
    let kind = request.kind;
    match world.spawn(request) {
        Ok(id) => report.spawned.push(id),
        Err(e) => {
            log::warn!("Rejected {} spawn: {}", kind.as_str(), e);
            report.rejected.push(e);
        }
    }
}

fn index_in(entities: &[Entity], id: EntityId) -> Option<usize> {
    entities.binary_search_by_key(&id, |e| e.id).ok()
}

/// Deliver one lifecycle event to both sides of the pair, first then second.
/// A handler that overflows faults its entity.
fn dispatch(
    entities: &mut [Entity],
    settings: &Settings,
    event: &ContactEvent,
    faults: &mut Vec<EngineFault>,
    faulted: &mut Vec<EntityId>,
) {
    let (Some(a), Some(b)) = (index_in(entities, event.first), index_in(entities, event.second))
    else {
        return;
    };
    match event.kind {
        ContactEventKind::Enter => log::debug!("Enter ({}, {})", event.first, event.second),
        ContactEventKind::Exit => log::debug!("Exit ({}, {})", event.first, event.second),
        ContactEventKind::Continue => {}
    }
    for (to, from) in [(a, b), (b, a)] {
        if let Err(error) = deliver(entities, settings, event.kind, to, from) {
            let entity = entities[to].id;
            log::warn!("Entity {} rejected in contact handler: {}", entity, error);
            faults.push(EngineFault::Arithmetic { entity, error });
            if !faulted.contains(&entity) {
                faulted.push(entity);
            }
        }
    }
}

fn deliver(
    entities: &mut [Entity],
    settings: &Settings,
    kind: ContactEventKind,
    to: usize,
    from: usize,
) -> Result<(), ArithmeticError> {
    let other = entities[from].counterpart();
    let Entity { body, behavior, .. } = &mut entities[to];
    let reaction = match kind {
        ContactEventKind::Enter => behavior.on_enter(body, &other)?,
        ContactEventKind::Continue => {
            behavior.on_continue(body, &other, settings)?;
            Reaction::default()
        }
        ContactEventKind::Exit => {
            behavior.on_exit(body, &other);
            Reaction::default()
        }
    };

    if reaction.damage > 0 {
        let target = &mut entities[from].body;
        if target.kind.takes_damage() {
            target.health = target.health.saturating_sub(reaction.damage);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CapacityPolicy;

    fn fx(s: &str) -> Fixed {
        s.parse().unwrap()
    }

    fn at(x: &str, y: &str) -> FixedVec3 {
        FixedVec3::xy(fx(x), fx(y))
    }

    fn world_with(settings: Settings) -> World {
        World::new(settings, 7).unwrap()
    }

    /// Asteroid that never moves
    fn rock(world: &mut World, position: FixedVec3, diameter: &str) -> EntityId {
        world
            .spawn(
                SpawnRequest::asteroid(position, FixedVec3::from_ints(1, 0))
                    .with_speed(Fixed::ZERO)
                    .with_scale(fx(diameter)),
            )
            .unwrap()
    }

    fn count_all(reports: &[StepReport], kind: ContactEventKind, a: EntityId, b: EntityId) -> usize {
        reports.iter().map(|r| r.count(kind, a, b)).sum()
    }

    #[test]
    fn test_concrete_overlap_scenario() {
        let mut world = world_with(Settings::default());
        let a = rock(&mut world, at("0", "0"), "2");
        let b = rock(&mut world, at("1.5", "0"), "2");

        let first = world.step(&StepInput::default());
        assert_eq!(first.count(ContactEventKind::Enter, a, b), 1);
        assert_eq!(first.count(ContactEventKind::Continue, a, b), 1);
        assert!(world.contacts().any(|c| c.involves(a) && c.involves(b)));

        let second = world.step(&StepInput::default());
        assert_eq!(second.count(ContactEventKind::Enter, a, b), 0);
        assert_eq!(second.count(ContactEventKind::Continue, a, b), 1);

        let index = world.index_of(b).unwrap();
        world.entities[index].body.position = at("3", "0");

        let third = world.step(&StepInput::default());
        assert_eq!(third.count(ContactEventKind::Exit, a, b), 1);
        assert_eq!(world.contacts().count(), 0);

        let fourth = world.step(&StepInput::default());
        assert!(fourth.events.is_empty());
    }

    #[test]
    fn test_enter_once_exit_once_over_span() {
        let mut world = world_with(Settings::default());
        let target = rock(&mut world, at("5", "5"), "1");
        let sensor = world
            .spawn(SpawnRequest::placeholder(at("1", "1")))
            .unwrap();

        let away = StepInput {
            pointer: Some(at("1", "1")),
            ..Default::default()
        };
        let over = StepInput {
            pointer: Some(at("5.2", "5")),
            ..Default::default()
        };

        let mut reports = vec![world.step(&away)];
        for _ in 0..5 {
            reports.push(world.step(&over));
            assert!(world.entity(sensor).unwrap().is_colliding());
        }
        reports.push(world.step(&away));
        reports.push(world.step(&away));

        assert_eq!(count_all(&reports, ContactEventKind::Enter, target, sensor), 1);
        assert_eq!(reports[1].count(ContactEventKind::Enter, target, sensor), 1);
        assert_eq!(count_all(&reports, ContactEventKind::Continue, target, sensor), 5);
        assert_eq!(count_all(&reports, ContactEventKind::Exit, target, sensor), 1);
        assert_eq!(reports[6].count(ContactEventKind::Exit, target, sensor), 1);
        assert!(!world.entity(sensor).unwrap().is_colliding());
        // sensors are never hurt, and rocks ignore them
        assert_eq!(world.entities().len(), 2);
    }

    #[test]
    fn test_projectile_spares_its_shooter() {
        let mut world = world_with(Settings::default());
        let ufo = world.spawn(SpawnRequest::ufo(at("5", "5"))).unwrap();
        let blast = world
            .spawn(SpawnRequest::blast(at("5", "5"), FixedVec3::from_ints(1, 0), ufo).with_speed(Fixed::ZERO))
            .unwrap();

        let report = world.step(&StepInput::default());
        assert_eq!(report.count(ContactEventKind::Enter, ufo, blast), 1);
        assert_eq!(world.entity(ufo).unwrap().body.health, crate::consts::UFO_HEALTH);
        assert_eq!(world.entity(blast).unwrap().body.health, crate::consts::BLAST_HEALTH);
        assert!(report.despawned.is_empty());
    }

    #[test]
    fn test_projectile_hits_other_entity() {
        let mut world = world_with(Settings::default());
        let ufo = world.spawn(SpawnRequest::ufo(at("2", "2"))).unwrap();
        let target = rock(&mut world, at("10", "5"), "1");
        let blast = world
            .spawn(SpawnRequest::blast(at("10", "5"), FixedVec3::from_ints(1, 0), ufo).with_speed(Fixed::ZERO))
            .unwrap();

        let report = world.step(&StepInput::default());
        assert_eq!(report.count(ContactEventKind::Enter, target, blast), 1);
        assert_eq!(world.entity(target).unwrap().body.health, crate::consts::ASTEROID_HEALTH - 1);
        assert!(world.entity(blast).is_none());
        assert_eq!(
            report.despawned,
            vec![Despawned {
                id: blast,
                kind: EntityKind::Blast,
                position: at("10", "5"),
                reason: DespawnReason::Destroyed,
            }]
        );
        assert_eq!(report.count(ContactEventKind::Exit, target, blast), 1);
    }

    #[test]
    fn test_sensor_does_not_destroy_blast() {
        let mut world = world_with(Settings::default());
        let ufo = world.spawn(SpawnRequest::ufo(at("2", "2"))).unwrap();
        let sensor = world.spawn(SpawnRequest::placeholder(at("10", "5"))).unwrap();
        let blast = world
            .spawn(SpawnRequest::blast(at("10", "5"), FixedVec3::from_ints(1, 0), ufo).with_speed(Fixed::ZERO))
            .unwrap();
        let hold = StepInput {
            pointer: Some(at("10", "5")),
            ..Default::default()
        };

        let report = world.step(&hold);
        assert_eq!(report.count(ContactEventKind::Enter, sensor, blast), 1);
        assert!(report.despawned.is_empty());
        assert!(world.entity(sensor).unwrap().is_colliding());
        assert_eq!(world.entity(sensor).unwrap().body.health, crate::consts::PLACEHOLDER_HEALTH);
        assert_eq!(world.entity(blast).unwrap().body.health, crate::consts::BLAST_HEALTH);
    }

    #[test]
    fn test_blast_damages_only_first_hit() {
        let mut world = world_with(Settings::default());
        let ufo = world.spawn(SpawnRequest::ufo(at("2", "2"))).unwrap();
        let left = rock(&mut world, at("10", "5"), "1");
        let right = rock(&mut world, at("10.5", "5"), "1");
        let blast = world
            .spawn(SpawnRequest::blast(at("10.25", "5"), FixedVec3::from_ints(1, 0), ufo).with_speed(Fixed::ZERO))
            .unwrap();

        let report = world.step(&StepInput::default());
        assert_eq!(report.count(ContactEventKind::Enter, left, blast), 1);
        assert_eq!(report.count(ContactEventKind::Enter, right, blast), 1);
        let health = |id| world.entity(id).unwrap().body.health;
        assert_eq!(health(left) + health(right), 2 * crate::consts::ASTEROID_HEALTH - 1);
        assert!(world.entity(blast).is_none());
    }

    #[test]
    fn test_boundary_despawn() {
        let mut world = world_with(Settings::default());
        let runaway = world
            .spawn(SpawnRequest::asteroid(at("18.9", "5"), FixedVec3::from_ints(1, 0)).with_speed(Fixed::from_int(60)))
            .unwrap();
        let stay = rock(&mut world, at("9", "5"), "1");

        let report = world.step(&StepInput::default());
        assert_eq!(report.despawned.len(), 1);
        assert_eq!(report.despawned[0].id, runaway);
        assert_eq!(report.despawned[0].reason, DespawnReason::OutOfBounds);

        for _ in 0..10 {
            world.step(&StepInput::default());
            assert!(world.entity(runaway).is_none());
        }
        assert!(world.entity(stay).is_some());
    }

    #[test]
    fn test_contact_capacity_reject_surfaces_fault() {
        let mut settings = Settings::default();
        settings.contact_capacity = 2;
        settings.capacity_policy = CapacityPolicy::Reject;
        let mut world = world_with(settings);
        let ids: Vec<_> = (0..4).map(|_| rock(&mut world, at("9", "5"), "1")).collect();

        let report = world.step(&StepInput::default());
        let exhausted = report
            .faults
            .iter()
            .filter(|f| matches!(f, EngineFault::ContactSlabExhausted { capacity: 2, .. }))
            .count();
        assert_eq!(exhausted, 4);
        assert!(report.check().is_err());
        assert_eq!(world.contacts().count(), 2);
        let kept: Vec<_> = world.contacts().map(|c| (c.first, c.second)).collect();
        assert_eq!(kept, vec![(ids[0], ids[1]), (ids[0], ids[2])]);

        // existing entries survive the next overflow untouched
        let report = world.step(&StepInput::default());
        let after: Vec<_> = world.contacts().map(|c| (c.first, c.second)).collect();
        assert_eq!(after, kept);
        assert!(report.events.iter().all(|e| e.kind == ContactEventKind::Continue));
    }

    #[test]
    fn test_contact_capacity_grow_keeps_everything() {
        let mut settings = Settings::default();
        settings.contact_capacity = 2;
        let mut world = world_with(settings);
        for _ in 0..4 {
            rock(&mut world, at("9", "5"), "1");
        }

        let report = world.step(&StepInput::default());
        assert_eq!(report.faults.len(), 4);
        assert_eq!(world.contacts().count(), 6);
        let enters = report
            .events
            .iter()
            .filter(|e| e.kind == ContactEventKind::Enter)
            .count();
        assert_eq!(enters, 6);
    }

    #[test]
    fn test_grid_capacity_grow_still_tests_pairs() {
        let mut settings = Settings::default();
        settings.cell_capacity = 1;
        let mut world = world_with(settings);
        let a = rock(&mut world, at("9", "5"), "1");
        let b = rock(&mut world, at("9.5", "5"), "1");

        let report = world.step(&StepInput::default());
        assert!(report
            .faults
            .iter()
            .any(|f| matches!(f, EngineFault::GridCellExhausted { capacity: 1, .. })));
        assert_eq!(report.count(ContactEventKind::Enter, a, b), 1);
    }

    #[test]
    fn test_ufo_destroyed_by_asteroid() {
        let mut world = world_with(Settings::default());
        let ufo = world.spawn(SpawnRequest::ufo(at("5", "5"))).unwrap();
        let boulder = rock(&mut world, at("5", "5"), "3");

        let report = world.step(&StepInput::default());
        assert!(report
            .despawned
            .iter()
            .any(|d| d.id == ufo && d.reason == DespawnReason::Destroyed));
        assert!(world.entity(boulder).is_some());
    }

    #[test]
    fn test_despawn_releases_sensor() {
        let mut world = world_with(Settings::default());
        let target = rock(&mut world, at("5", "5"), "1");
        let sensor = world.spawn(SpawnRequest::placeholder(at("5", "5"))).unwrap();
        let hold = StepInput {
            pointer: Some(at("5", "5")),
            ..Default::default()
        };

        world.step(&hold);
        assert!(world.entity(sensor).unwrap().is_colliding());

        let index = world.index_of(target).unwrap();
        world.entities[index].body.health = 0;
        let report = world.step(&hold);
        assert_eq!(report.count(ContactEventKind::Exit, target, sensor), 1);
        assert!(!world.entity(sensor).unwrap().is_colliding());
        assert!(world.entity(target).is_none());
    }

    #[test]
    fn test_overflow_rejects_entity() {
        let mut world = world_with(Settings::default());
        let doomed = world
            .spawn(
                SpawnRequest::asteroid(FixedVec3::xy(Fixed::MAX, Fixed::ZERO), FixedVec3::from_ints(1, 0))
                    .with_speed(Fixed::from_int(1000)),
            )
            .unwrap();

        let report = world.step(&StepInput::default());
        assert!(report
            .faults
            .contains(&EngineFault::Arithmetic {
                entity: doomed,
                error: crate::error::ArithmeticError::Overflow,
            }));
        assert_eq!(report.despawned[0].reason, DespawnReason::Fault);
        assert!(world.entities().is_empty());
    }

    #[test]
    fn test_faulted_entity_skips_collision() {
        let mut world = world_with(Settings::default());
        let doomed = world
            .spawn(
                SpawnRequest::asteroid(at("5", "5"), FixedVec3::from_ints(1, 0))
                    .with_speed(Fixed::MAX)
                    .with_scale(Fixed::ONE),
            )
            .unwrap();
        let sensor = world.spawn(SpawnRequest::placeholder(at("5", "5"))).unwrap();

        let report = world.step(&StepInput {
            pointer: Some(at("5", "5")),
            ..Default::default()
        });
        assert!(report.events.is_empty());
        assert!(!world.entity(sensor).unwrap().is_colliding());
        assert_eq!(report.despawned.len(), 1);
        assert_eq!(report.despawned[0].id, doomed);
        assert_eq!(report.despawned[0].reason, DespawnReason::Fault);
    }

    #[test]
    fn test_invalid_input_spawn_is_reported() {
        let mut world = world_with(Settings::default());
        let input = StepInput {
            pointer: None,
            spawns: vec![SpawnRequest::blast(at("3", "3"), FixedVec3::ZERO, 1)],
        };
        let report = world.step(&input);
        assert!(report.spawned.is_empty());
        assert!(matches!(report.rejected[..], [SimError::InvalidSpawn(_)]));
    }

    #[test]
    fn test_ufos_fire_at_each_other() {
        let mut world = world_with(Settings::default());
        let left = world.spawn(SpawnRequest::ufo(at("3", "5"))).unwrap();
        let right = world.spawn(SpawnRequest::ufo(at("15", "5"))).unwrap();

        let mut blasts = Vec::new();
        for _ in 0..150 {
            let report = world.step(&StepInput::default());
            blasts.extend(report.spawned);
        }
        assert!(!blasts.is_empty());
        let sources: Vec<_> = blasts
            .iter()
            .filter_map(|&id| world.entity(id))
            .filter_map(|e| match e.behavior {
                crate::sim::behavior::Behavior::Projectile { source } => source,
                _ => None,
            })
            .collect();
        assert!(sources.contains(&left) && sources.contains(&right));
    }

    fn run(seed: u64, steps: usize) -> (Vec<Entity>, Vec<StepReport>) {
        let mut world = World::new(Settings::default(), seed).unwrap();
        world.populate().unwrap();
        for (x, y) in [(3, 3), (9, 7), (15, 4)] {
            world.spawn(SpawnRequest::ufo(FixedVec3::from_ints(x, y))).unwrap();
        }
        world.spawn(SpawnRequest::placeholder(FixedVec3::from_ints(9, 5))).unwrap();

        let mut reports = Vec::new();
        for step in 0..steps {
            let pointer = FixedVec3::xy(
                Fixed::from_ratio(step as i32 % 180, 10),
                Fixed::from_int(5),
            );
            reports.push(world.step(&StepInput {
                pointer: Some(pointer),
                ..Default::default()
            }));
        }
        (world.entities().to_vec(), reports)
    }

    #[test]
    fn test_determinism() {
        let (entities_a, reports_a) = run(99, 400);
        let (entities_b, reports_b) = run(99, 400);
        assert_eq!(entities_a, entities_b);
        assert_eq!(reports_a, reports_b);
        assert!(reports_a.iter().any(|r| !r.events.is_empty()));
    }
}
