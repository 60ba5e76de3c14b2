//! Deer controller - the prey exemplar
//!
//! Each deer layers idle/wander randomisation on top of its Escape AI. The
//! randomness comes from the deer's own generator so one deer's choices
//! never shift another's.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::DeerConfig;
use crate::core::math::direction_from_angle;
use crate::core::rng::EntityRng;
use crate::core::types::Species;
use crate::entity::animal::{Animal, AnimalState, RosterEntry};
use crate::entity::vitals::stamina_gated_max_speed;
use crate::spatial::{IndexedEntry, SpatialIndex};
use crate::steering::{BoidsParams, GroupAi, Neighbor, SteeringInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeerState {
    rng: EntityRng,
    pub wander_angle: f32,
    wander_timer: f32,
    pub idle: bool,
    idle_timer: f32,
    threat_timer: f32,
}

impl DeerState {
    pub fn new(identity: u64, spawn: Vec3) -> Self {
        let mut rng = EntityRng::from_identity(identity, spawn);
        let wander_angle = rng.range(0.0, TAU);
        Self {
            rng,
            wander_angle,
            wander_timer: 0.0,
            idle: false,
            idle_timer: 0.0,
            threat_timer: 0.0,
        }
    }

    pub fn wander_direction(&self) -> Vec3 {
        direction_from_angle(self.wander_angle)
    }

    /// Toggle idle/move and perturb the wander heading when their timers run out
    fn advance_wander(&mut self, fleeing: bool, config: &DeerConfig, dt: f32) {
        if fleeing {
            self.idle = false;
            self.idle_timer = 0.0;
        } else {
            self.idle_timer -= dt;
            if self.idle_timer <= 0.0 {
                self.idle = self.rng.chance(config.idle_chance);
                self.idle_timer = self.rng.range(config.idle_time_min, config.idle_time_max);
            }
        }

        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            self.wander_angle += self.rng.range(-config.wander_turn, config.wander_turn);
            self.wander_timer = self
                .rng
                .range(config.wander_interval_min, config.wander_interval_max);
        }
    }

    /// Wander plus per-tick jitter, damped while fleeing
    fn wander_force(&mut self, fleeing: bool, config: &DeerConfig) -> Vec3 {
        let (wander_scale, jitter_scale) = if fleeing {
            (config.flee_wander_scale, config.flee_jitter_scale)
        } else {
            (1.0, 1.0)
        };
        let jitter = direction_from_angle(self.rng.range(0.0, TAU));
        self.wander_direction() * config.wander_strength * wander_scale
            + jitter * config.jitter_strength * jitter_scale
    }
}

/// Threat sharing: own state, then neighbour gossip, then a fresh look around
fn evaluate_threat(
    ai: &mut GroupAi,
    position: Vec3,
    neighbors: &[Neighbor],
    roster: &SpatialIndex<RosterEntry>,
    config: &DeerConfig,
) {
    let is_wolf = |e: &IndexedEntry<RosterEntry>| e.data.species == Species::Wolf;

    if ai.shared_target().is_some() {
        // Keep tracking the closest wolf while one is still in sight
        if let Some(wolf) = roster.nearest(position, Some(config.clear_range), &[], is_wolf) {
            ai.set_shared_target(wolf.position);
        }
        return;
    }
    if let Some(threat) = neighbors.iter().find_map(|n| n.shared_target) {
        ai.set_shared_target(threat);
        return;
    }
    if let Some(wolf) = roster.nearest(position, Some(config.alert_range), &[], is_wolf) {
        ai.set_shared_target(wolf.position);
    }
}

/// One tick of deer behaviour
pub fn update_deer(
    animal: &mut Animal,
    roster: &SpatialIndex<RosterEntry>,
    config: &DeerConfig,
    dt: f32,
    bounds: (Vec3, Vec3),
) {
    let AnimalState::Deer(state) = &mut animal.state else {
        return;
    };

    state.threat_timer -= dt;
    if state.threat_timer <= 0.0 {
        state.threat_timer = config.threat_check_interval;
        evaluate_threat(&mut animal.ai, animal.position, &animal.neighbors, roster, config);
    }
    if let Some(threat) = animal.ai.shared_target() {
        if animal.position.distance(threat) > config.clear_range {
            animal.ai.clear_shared_target();
        }
    }

    let fleeing = animal.ai.shared_target().is_some();
    state.advance_wander(fleeing, config, dt);

    let top_speed = if fleeing {
        config.flee_max_speed
    } else {
        config.base_max_speed
    };
    let max_speed = stamina_gated_max_speed(animal.stamina.ratio(), config.min_max_speed, top_speed);

    let force = if state.idle {
        // Grazing: shed speed, ignore the herd
        animal.velocity *= (1.0 - config.idle_brake * dt).max(0.0);
        Vec3::ZERO
    } else {
        let params = BoidsParams {
            max_speed,
            ..config.boids
        };
        let input = SteeringInput {
            position: animal.position,
            velocity: animal.velocity,
            neighbors: &animal.neighbors,
            params: &params,
            dt,
        };
        animal.ai.update(&input, &mut state.rng) + state.wander_force(fleeing, config)
    };

    animal.integrate(force, max_speed, dt, bounds);
    animal.update_stamina(&config.stamina, config.base_max_speed, fleeing, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::derive_seed;
    use crate::core::types::EntityId;

    fn bounds() -> (Vec3, Vec3) {
        (Vec3::splat(-100.0), Vec3::splat(100.0))
    }

    fn roster_with(entries: &[(u64, Vec3, Species)]) -> SpatialIndex<RosterEntry> {
        let mut roster = SpatialIndex::new(8.0);
        for (id, pos, species) in entries {
            roster.insert(
                EntityId(*id),
                *pos,
                RosterEntry {
                    species: *species,
                    velocity: Vec3::ZERO,
                    stamina_ratio: 1.0,
                    shared_target: None,
                },
            );
        }
        roster
    }

    #[test]
    fn test_siblings_diverge() {
        let spawns = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 3.0),
            Vec3::new(-4.0, 0.0, 1.5),
        ];
        let seeds: Vec<u64> = spawns.iter().map(|s| derive_seed(99, *s)).collect();
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }

        let headings: Vec<Vec3> = spawns
            .iter()
            .map(|s| DeerState::new(99, *s).wander_direction())
            .collect();
        assert!(headings.iter().any(|h| h.distance(headings[0]) > 1e-3));
    }

    #[test]
    fn test_spots_wolf_in_alert_range() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 5, &config);
        let roster = roster_with(&[(2, Vec3::new(10.0, 0.0, 0.0), Species::Wolf)]);
        update_deer(&mut deer, &roster, &config, 1.0 / 60.0, bounds());
        assert_eq!(deer.ai.shared_target(), Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ignores_distant_wolf() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 5, &config);
        let roster = roster_with(&[(2, Vec3::new(30.0, 0.0, 0.0), Species::Wolf)]);
        update_deer(&mut deer, &roster, &config, 1.0 / 60.0, bounds());
        assert!(!deer.is_alerted());
    }

    #[test]
    fn test_threat_gossip_from_neighbor() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 5, &config);
        let threat = Vec3::new(-12.0, 0.0, 4.0);
        deer.neighbors = vec![Neighbor::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO).with_shared_target(threat)];
        update_deer(&mut deer, &roster_with(&[]), &config, 1.0 / 60.0, bounds());
        assert_eq!(deer.ai.shared_target(), Some(threat));
    }

    #[test]
    fn test_threat_cleared_beyond_clear_range() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 5, &config);
        deer.ai.set_shared_target(Vec3::new(config.clear_range + 5.0, 0.0, 0.0));
        update_deer(&mut deer, &roster_with(&[]), &config, 1.0 / 60.0, bounds());
        assert!(!deer.is_alerted());
    }

    #[test]
    fn test_fleeing_deer_moves_away_and_never_idles() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 5, &config);
        let roster = roster_with(&[(2, Vec3::new(5.0, 0.0, 0.0), Species::Wolf)]);
        for _ in 0..60 {
            update_deer(&mut deer, &roster, &config, 1.0 / 60.0, bounds());
            if let AnimalState::Deer(state) = &deer.state {
                assert!(!state.idle);
            }
        }
        assert!(deer.position.x < 0.0);
        assert!(deer.stamina.current < config.stamina.max);
    }

    #[test]
    fn test_calm_deer_idles_some_of_the_time() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 77, &config);
        let roster = roster_with(&[]);
        let mut idle_ticks = 0;
        let mut moving_ticks = 0;
        for _ in 0..6000 {
            update_deer(&mut deer, &roster, &config, 1.0 / 60.0, bounds());
            if let AnimalState::Deer(state) = &deer.state {
                if state.idle {
                    idle_ticks += 1;
                } else {
                    moving_ticks += 1;
                }
            }
        }
        assert!(idle_ticks > 0);
        assert!(moving_ticks > 0);
    }
}
