//! Flocking steering and the group AI variants built on it
//!
//! The boids kernel is stateless. `GroupAi` wraps it with the per-species
//! tactics: prey escape from a shared threat, predators patrol and pursue.

pub mod attack;
pub mod boids;
pub mod escape;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::math::{limit, normalize_or_zero};

pub use attack::{AttackAi, AttackParams};
pub use boids::{compute, compute_detailed, BoidsForces, BoidsParams, Neighbor};
pub use escape::{EscapeAi, EscapeParams};

/// Per-tick input to a group AI
#[derive(Debug, Clone, Copy)]
pub struct SteeringInput<'a> {
    pub position: Vec3,
    pub velocity: Vec3,
    pub neighbors: &'a [Neighbor],
    /// Archetype params with this tick's speed cap already applied
    pub params: &'a BoidsParams,
    pub dt: f32,
}

/// Steer toward `target` at full speed
///
/// Returns zero when already on the target.
pub fn seek(position: Vec3, velocity: Vec3, target: Vec3, max_speed: f32, max_force: f32) -> Vec3 {
    let to_target = target - position;
    if to_target.length() < 0.001 {
        return Vec3::ZERO;
    }
    let desired = normalize_or_zero(to_target) * max_speed;
    limit(desired - velocity, max_force)
}

/// Group AI strategy, fixed for an animal's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupAi {
    Escape(EscapeAi),
    Attack(AttackAi),
}

impl GroupAi {
    /// Threat (escape) or hunt target (attack) shared with the flock
    pub fn shared_target(&self) -> Option<Vec3> {
        match self {
            GroupAi::Escape(ai) => ai.threat(),
            GroupAi::Attack(ai) => ai.target(),
        }
    }

    pub fn set_shared_target(&mut self, position: Vec3) {
        match self {
            GroupAi::Escape(ai) => ai.set_threat(position),
            GroupAi::Attack(ai) => ai.set_target(position),
        }
    }

    pub fn clear_shared_target(&mut self) {
        match self {
            GroupAi::Escape(ai) => ai.clear_threat(),
            GroupAi::Attack(ai) => ai.clear_target(),
        }
    }

    pub fn update<R: Rng>(&mut self, input: &SteeringInput<'_>, rng: &mut R) -> Vec3 {
        match self {
            GroupAi::Escape(ai) => ai.update(input),
            GroupAi::Attack(ai) => ai.update(input, rng),
        }
    }
}
