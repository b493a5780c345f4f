//! Arena Sim entry point
//!
//! Headless native runner: builds a world, drives it with the fixed-timestep
//! accumulator loop and prints the final snapshot as JSON.
//!
//! Usage: `arena-sim [settings.json] [seed] [frames]`

use std::process::ExitCode;

use arena_sim::consts::MAX_SUBSTEPS;
use arena_sim::sim::{DespawnReason, Fixed, FixedVec3, SpawnRequest, StepInput, World};
use arena_sim::{Settings, SimError};

/// Simulated display frame time (30 Hz)
const FRAME_DT: Fixed = Fixed::from_ratio(1, 30);
const DEFAULT_FRAMES: u32 = 600;
const DEFAULT_SEED: u64 = 12345;

struct Args {
    settings: Option<String>,
    seed: u64,
    frames: u32,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let settings = args.next().filter(|s| s != "-");
    let seed = match args.next() {
        Some(s) => s.parse().map_err(|e| format!("bad seed {s:?}: {e}"))?,
        None => DEFAULT_SEED,
    };
    let frames = match args.next() {
        Some(s) => s.parse().map_err(|e| format!("bad frame count {s:?}: {e}"))?,
        None => DEFAULT_FRAMES,
    };
    Ok(Args {
        settings,
        seed,
        frames,
    })
}

fn build_world(settings: Settings, seed: u64) -> Result<World, SimError> {
    let mut world = World::new(settings, seed)?;
    world.populate()?;

    let (w, h) = (world.settings().scene_width, world.settings().scene_height);
    let quarter = Fixed::from_ratio(1, 4);
    for (fx, fy) in [(1, 1), (3, 1), (2, 3)] {
        let position = FixedVec3::xy(w * quarter * Fixed::from_int(fx), h * quarter * Fixed::from_int(fy));
        world.spawn(SpawnRequest::ufo(position))?;
    }
    world.spawn(SpawnRequest::placeholder(FixedVec3::xy(w * Fixed::HALF, h * Fixed::HALF)))?;
    Ok(world)
}

/// Pointer sweeping left to right across the middle of the scene
fn pointer_at(world: &World, frame: u32) -> FixedVec3 {
    let settings = world.settings();
    let period = 240;
    let t = Fixed::from_ratio((frame % period) as i32, period as i32);
    FixedVec3::xy(settings.scene_width * t, settings.scene_height * Fixed::HALF)
}

fn run(args: Args) -> Result<(), SimError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let dt = settings.dt;
    let mut world = build_world(settings, args.seed)?;
    log::info!(
        "Running {} frames with {} entities",
        args.frames,
        world.entities().len()
    );

    let mut accumulator = Fixed::ZERO;
    let mut faults = 0usize;
    let mut destroyed = 0usize;
    for frame in 0..args.frames {
        accumulator += FRAME_DT;
        let input = StepInput {
            pointer: Some(pointer_at(&world, frame)),
            ..Default::default()
        };

        let mut substeps = 0;
        while accumulator >= dt && substeps < MAX_SUBSTEPS {
            let report = world.step(&input);
            for fault in &report.faults {
                log::warn!("tick {}: {}", report.tick, fault);
            }
            faults += report.faults.len();
            for gone in &report.despawned {
                if gone.reason == DespawnReason::Destroyed {
                    destroyed += 1;
                }
                log::debug!(
                    "tick {}: {} {} despawned ({:?}) at {:?}",
                    report.tick,
                    gone.kind.as_str(),
                    gone.id,
                    gone.reason,
                    gone.position.truncate()
                );
            }
            accumulator -= dt;
            substeps += 1;
        }
        // Drop backlog past the substep cap (spiral of death guard)
        if substeps == MAX_SUBSTEPS {
            accumulator = Fixed::ZERO;
        }
    }

    log::info!(
        "Finished at tick {}: {} entities, {} live contacts, {} destroyed, {} faults",
        world.tick_count(),
        world.entities().len(),
        world.contacts().count(),
        destroyed,
        faults
    );

    match serde_json::to_string_pretty(&world.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    // env_logger is a native-only dependency
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Arena Sim (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: arena-sim [settings.json|-] [seed] [frames]");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
