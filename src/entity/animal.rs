//! Wildlife entities driven by a group AI

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::{AnimalStaminaParams, DeerConfig, WolfConfig};
use crate::core::math::{flatten, limit};
use crate::core::types::{EntityId, Species};
use crate::entity::species::deer::DeerState;
use crate::entity::species::wolf::WolfState;
use crate::entity::vitals::{Health, Stamina};
use crate::steering::{AttackAi, EscapeAi, GroupAi, Neighbor};

/// What other animals may know about this one during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub species: Species,
    pub velocity: Vec3,
    pub stamina_ratio: f32,
    pub shared_target: Option<Vec3>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnimalState {
    Deer(DeerState),
    Wolf(WolfState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: EntityId,
    pub species: Species,
    pub position: Vec3,
    pub velocity: Vec3,
    pub spawn: Vec3,
    pub stamina: Stamina,
    pub health: Health,
    pub ai: GroupAi,
    /// Rebuilt by flock registration every tick
    pub neighbors: Vec<Neighbor>,
    pub state: AnimalState,
    pub alive: bool,
}

impl Animal {
    /// A deer whose private generator is seeded from `identity` and its spawn point
    pub fn deer(id: EntityId, position: Vec3, identity: u64, config: &DeerConfig) -> Self {
        Self {
            id,
            species: Species::Deer,
            position,
            velocity: Vec3::ZERO,
            spawn: position,
            stamina: Stamina::full(config.stamina.max),
            health: Health::full(config.max_health),
            ai: GroupAi::Escape(EscapeAi::new(config.escape)),
            neighbors: Vec::new(),
            state: AnimalState::Deer(DeerState::new(identity, position)),
            alive: true,
        }
    }

    pub fn wolf(id: EntityId, position: Vec3, config: &WolfConfig) -> Self {
        Self {
            id,
            species: Species::Wolf,
            position,
            velocity: Vec3::ZERO,
            spawn: position,
            stamina: Stamina::full(config.stamina.max),
            health: Health::full(config.max_health),
            ai: GroupAi::Attack(AttackAi::new(config.attack)),
            neighbors: Vec::new(),
            state: AnimalState::Wolf(WolfState::default()),
            alive: true,
        }
    }

    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry {
            species: self.species,
            velocity: self.velocity,
            stamina_ratio: self.stamina.ratio(),
            shared_target: self.ai.shared_target(),
        }
    }

    /// Reacting to a threat (deer) or chasing a target (wolf)
    pub fn is_alerted(&self) -> bool {
        self.ai.shared_target().is_some()
    }

    /// First neighbour snapshot carrying a shared threat or target
    pub fn gossiped_target(&self) -> Option<Vec3> {
        self.neighbors.iter().find_map(|n| n.shared_target)
    }

    /// Apply a steering force and move, staying inside `bounds`
    pub fn integrate(&mut self, force: Vec3, max_speed: f32, dt: f32, bounds: (Vec3, Vec3)) {
        self.velocity = limit(flatten(self.velocity + force * dt), max_speed);
        let next = self.position + self.velocity * dt;

        let (min, max) = bounds;
        let clamped = Vec3::new(next.x.clamp(min.x, max.x), 0.0, next.z.clamp(min.z, max.z));
        if clamped.x != next.x {
            self.velocity.x = 0.0;
        }
        if clamped.z != next.z {
            self.velocity.z = 0.0;
        }
        self.position = clamped;
    }

    /// Drain while moving, recover while (nearly) standing still
    pub fn update_stamina(&mut self, params: &AnimalStaminaParams, base_speed: f32, exerting: bool, dt: f32) {
        let fraction = if base_speed > 0.0 {
            self.velocity.length() / base_speed
        } else {
            0.0
        };
        if fraction < params.rest_speed_fraction {
            self.stamina.recover(params.recovery_per_second * dt);
        } else {
            let multiplier = if exerting { params.exertion_multiplier } else { 1.0 };
            self.stamina
                .drain(params.drain_per_second * fraction * multiplier * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> (Vec3, Vec3) {
        (Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_integrate_caps_speed_and_flattens() {
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 0, &DeerConfig::default());
        deer.integrate(Vec3::new(500.0, 30.0, 0.0), 6.0, 0.1, bounds());
        assert!((deer.velocity.length() - 6.0).abs() < 1e-4);
        assert_eq!(deer.position.y, 0.0);
    }

    #[test]
    fn test_integrate_stops_at_edge() {
        let mut wolf = Animal::wolf(EntityId(2), Vec3::new(9.9, 0.0, 0.0), &WolfConfig::default());
        wolf.velocity = Vec3::new(5.0, 0.0, 1.0);
        wolf.integrate(Vec3::ZERO, 7.5, 0.1, bounds());
        assert_eq!(wolf.position.x, 10.0);
        assert_eq!(wolf.velocity.x, 0.0);
        assert!(wolf.velocity.z > 0.0);
    }

    #[test]
    fn test_stamina_drains_when_running_recovers_when_still() {
        let config = DeerConfig::default();
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 0, &config);
        deer.velocity = Vec3::new(6.0, 0.0, 0.0);
        deer.update_stamina(&config.stamina, 6.0, false, 1.0);
        let calm = deer.stamina.current;
        assert!((calm - 95.0).abs() < 1e-4);

        deer.update_stamina(&config.stamina, 6.0, true, 1.0);
        assert!((calm - deer.stamina.current - 10.0).abs() < 1e-4);

        deer.velocity = Vec3::ZERO;
        deer.update_stamina(&config.stamina, 6.0, false, 1.0);
        assert!((deer.stamina.current - (calm - 10.0 + 8.0)).abs() < 1e-4);
    }

    #[test]
    fn test_roster_entry_mirrors_ai() {
        let mut deer = Animal::deer(EntityId(1), Vec3::ZERO, 0, &DeerConfig::default());
        assert_eq!(deer.roster_entry().shared_target, None);
        deer.ai.set_shared_target(Vec3::ONE);
        assert_eq!(deer.roster_entry().shared_target, Some(Vec3::ONE));
        assert!(deer.is_alerted());
    }
}
