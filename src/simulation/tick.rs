//! Tick system - orchestrates simulation updates
//!
//! One fixed-timestep tick runs these phases in order:
//! clock -> generation -> workshop orders -> flock registration ->
//! wildlife -> attack resolution -> villagers
//!
//! Only flock registration fans out over rayon; every mutation happens on
//! the calling thread.

use glam::Vec3;
use serde::Serialize;
use tracing::debug;

use crate::city::{tick_workshop_orders, ItemType};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::jobs::JobEvent;
use crate::simulation::flock::{register_flocks, FlockRadii};
use crate::simulation::village::update_villagers;
use crate::simulation::wildlife::{resolve_attacks, update_animals};
use crate::world::{GenerateKind, GeneratorContext};

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimulationEvent {
    /// A generate request ran out and its generators fired
    Generated { kind: GenerateKind },
    DeerSpawned { id: EntityId, position: Vec3 },
    /// A workshop queued a craft order
    OrderPlaced { workshop: EntityId, product: ItemType },
    Attack { attacker: EntityId, target: EntityId, damage: f32 },
    Killed { predator: EntityId, prey: EntityId, carcass: EntityId },
    Job(JobEvent),
}

pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    world.clock.advance();
    let dt = world.clock.delta();

    run_generation(world, dt, &mut events);

    for order in tick_workshop_orders(&mut world.facilities, &world.config.facilities, dt) {
        events.push(SimulationEvent::OrderPlaced {
            workshop: order.workshop,
            product: order.product,
        });
    }

    let radii = FlockRadii {
        deer: world.config.deer.flock_radius,
        wolf: world.config.wolf.flock_radius,
    };
    let roster = register_flocks(&mut world.animals, radii, world.config.parallel_threshold);

    let attacks = update_animals(world, &roster);
    events.extend(attacks.iter().map(|a| SimulationEvent::Attack {
        attacker: a.attacker,
        target: a.target,
        damage: a.damage,
    }));
    for kill in resolve_attacks(world, &attacks) {
        events.push(SimulationEvent::Killed {
            predator: kill.predator,
            prey: kill.prey,
            carcass: kill.carcass,
        });
    }

    events.extend(update_villagers(world).into_iter().map(SimulationEvent::Job));
    events
}

/// Count generate requests down and turn deer spawn points into animals
fn run_generation(world: &mut World, dt: f32, events: &mut Vec<SimulationEvent>) {
    let mut deer_spawns = Vec::new();
    let mut ctx = GeneratorContext {
        field: &mut world.field,
        collectibles: &mut world.collectibles,
        ids: &mut world.ids,
        rng: &mut world.rng,
        deer_spawns: &mut deer_spawns,
    };
    let fired = world.generation.tick(dt, &mut ctx);
    events.extend(fired.into_iter().map(|kind| SimulationEvent::Generated { kind }));

    for position in deer_spawns {
        let id = world.spawn_deer(position);
        debug!(deer = id.0, "Deer respawned");
        events.push(SimulationEvent::DeerSpawned { id, position });
    }
}
