//! Demo: a guard patrolling a waypoint loop while a pawn walks across the
//! map and is knocked out halfway through the run.
//!
//! Usage: `patrol [config.ron]`

use std::error::Error;
use std::process::ExitCode;

use patrol::prelude::*;

fn load_config() -> Result<SimulationConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SimulationConfig::load_ron(path)?),
        None => Ok(SimulationConfig::default()),
    }
}

/// Patrol container whose waypoints form a loop through `points`
fn build_patrol(world: &mut World, points: &[Vec3]) -> Result<hecs::Entity, Box<dyn Error>> {
    let root = world.spawn((Transform::default(), Name::new("Patrol")));

    let waypoints: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(i, &point)| {
            world.spawn((
                Transform::from_position(point),
                Name::new(format!("Waypoint {i}")),
            ))
        })
        .collect();

    for (i, &waypoint) in waypoints.iter().enumerate() {
        let next = waypoints[(i + 1) % waypoints.len()];
        world.insert_one(waypoint, Waypoint::new().with_next(next))?;
        world.add_child(root, waypoint)?;
    }

    let pattern = MovementPattern::collect(world, root);
    world.insert_one(root, pattern)?;
    Ok(root)
}

fn run(config: &SimulationConfig) -> Result<(), Box<dyn Error>> {
    let mut world = World::new();
    let root = build_patrol(&mut world, &config.patrol)?;
    let guard = world.spawn((Transform::from_xyz(-1.0, 0.0, 0.0), Name::new("Guard")));
    let runner = world.spawn((Transform::from_xyz(0.0, 0.0, -4.0), Name::new("Runner")));

    let mut scheduler = Scheduler::new(world);
    scheduler.add_controller(
        StateMachineAi::new(guard, config.ai_speed)
            .with_blackboard(Blackboard::new().with(PATTERN_KEY, root)),
    );

    let registry = ModuleRegistry::with_builtin();
    let mut pawn = Pawn::new(runner);
    for name in &config.pawn_modules {
        pawn.add_module(registry.create(name)?)?;
    }
    if let Some(mover) = pawn.get_module_mut::<BasicMover>() {
        mover.speed = config.mover_speed;
        mover.set_destination(8.0, 0.0, 8.0);
    }
    if let Some(health) = pawn.get_module_mut::<HealthModule>() {
        health.set_max_hp(config.max_hp);
    }
    scheduler.spawn_pawn(pawn)?;

    log::info!(
        "Running {} ticks of {:.4}s",
        config.max_ticks,
        config.fixed_delta
    );
    let knockout_tick = config.max_ticks / 2;
    for tick in 0..config.max_ticks {
        if tick == knockout_tick {
            log::info!("Knocking out runner at tick {tick}");
            scheduler.damage_pawn(runner, config.max_hp)?;
        }

        scheduler.tick(config.fixed_delta)?;

        let world = scheduler.world();
        for event in scheduler.events().iter() {
            match event {
                GameEvent::WaypointVisited {
                    controller,
                    element,
                    ..
                } => {
                    let name = world.get::<Name>(*controller);
                    let who = name.as_ref().map_or("?", |n| n.as_str());
                    log::info!("{who} visited waypoint {element}");
                }
                other => log::debug!("{other:?}"),
            }
        }
    }

    if let Some(position) = scheduler.world().position(guard) {
        log::info!(
            "Finished after {:.2}s, guard at {position}, {} pawns left",
            scheduler.elapsed(),
            scheduler.pawn_count()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
