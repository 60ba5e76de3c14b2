//! Wildlife phase: steer every animal, then resolve the hunt

use glam::Vec3;
use tracing::info;

use crate::core::types::{EntityId, Species};
use crate::ecs::world::World;
use crate::entity::animal::RosterEntry;
use crate::entity::species::{update_deer, update_wolf, AttackEvent};
use crate::spatial::SpatialIndex;
use crate::world::GenerateKind;

/// A deer brought down this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub predator: EntityId,
    pub prey: EntityId,
    pub position: Vec3,
    pub carcass: EntityId,
}

/// Move every living animal one tick; returns the attacks made
pub fn update_animals(world: &mut World, roster: &SpatialIndex<RosterEntry>) -> Vec<AttackEvent> {
    let dt = world.clock.delta();
    let phase = world.clock.phase();
    let bounds = world.field.bounds();
    let mut attacks = Vec::new();

    for animal in world.animals.iter_mut().filter(|a| a.alive) {
        match animal.species {
            Species::Deer => update_deer(animal, roster, &world.config.deer, dt, bounds),
            Species::Wolf => {
                let attack = update_wolf(animal, roster, &world.config.wolf, phase, dt, bounds, &mut world.rng);
                attacks.extend(attack);
            }
            Species::Human => {}
        }
    }
    attacks
}

/// Apply attacks after every animal has moved
///
/// A deer killed here leaves a carcass and queues a respawn. Attacks on
/// a target already dead this tick are ignored.
pub fn resolve_attacks(world: &mut World, attacks: &[AttackEvent]) -> Vec<Kill> {
    let mut kills = Vec::new();
    for attack in attacks {
        let Some(prey) = world
            .animals
            .iter_mut()
            .find(|a| a.id == attack.target && a.alive)
        else {
            continue;
        };
        if !prey.health.damage(attack.damage) {
            continue;
        }
        prey.alive = false;
        prey.velocity = Vec3::ZERO;
        let position = prey.position;

        let carcass = world.spawn_carcass(position);
        let delay = GenerateKind::Deer.delay(&world.config.generation);
        world.generation.request(GenerateKind::Deer, delay);
        info!(
            predator = attack.attacker.0,
            prey = attack.target.0,
            x = position.x,
            z = position.z,
            "Deer killed"
        );
        kills.push(Kill {
            predator: attack.attacker,
            prey: attack.target,
            position,
            carcass,
        });
    }
    world.animals.retain(|a| a.alive);
    kills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::world::CollectibleKind;

    #[test]
    fn test_fatal_attack_leaves_carcass_and_respawn() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        let wolf = world.spawn_wolf(Vec3::ZERO);
        let deer = world.spawn_deer(Vec3::new(1.0, 0.0, 0.0));
        let health = world.animal(deer).unwrap().health.current;

        let kills = resolve_attacks(
            &mut world,
            &[AttackEvent {
                attacker: wolf,
                target: deer,
                damage: health,
            }],
        );

        assert_eq!(kills.len(), 1);
        assert!(world.animal(deer).is_none());
        assert_eq!(world.collectibles.count_of(CollectibleKind::Carcass), 1);
        assert_eq!(world.generation.pending_of(GenerateKind::Deer), 1);
    }

    #[test]
    fn test_dead_target_only_dies_once() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        let wolf = world.spawn_wolf(Vec3::ZERO);
        let deer = world.spawn_deer(Vec3::new(1.0, 0.0, 0.0));
        let hit = AttackEvent {
            attacker: wolf,
            target: deer,
            damage: 1000.0,
        };
        let kills = resolve_attacks(&mut world, &[hit, hit]);
        assert_eq!(kills.len(), 1);
        assert_eq!(world.collectibles.count_of(CollectibleKind::Carcass), 1);
    }

    #[test]
    fn test_wound_is_not_a_kill() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        let wolf = world.spawn_wolf(Vec3::ZERO);
        let deer = world.spawn_deer(Vec3::new(1.0, 0.0, 0.0));
        let kills = resolve_attacks(
            &mut world,
            &[AttackEvent {
                attacker: wolf,
                target: deer,
                damage: 0.5,
            }],
        );
        assert!(kills.is_empty());
        assert!(world.animal(deer).unwrap().health.current < world.config.deer.max_health);
    }
}
