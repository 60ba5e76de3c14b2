//! Boids steering kernel
//!
//! Blends separation, alignment and cohesion into one steering force from a
//! snapshot of neighbours. Pure function of its inputs: no state is kept
//! between calls.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::math::{limit, normalize_or_zero, ZERO_LENGTH};

/// Flocking parameters for one species archetype
///
/// Group AI variants copy these and override weights locally each tick;
/// the archetype values themselves are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidsParams {
    /// Neighbours within this radius count for alignment and cohesion
    pub view_radius: f32,
    /// Neighbours within this radius push the boid away
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub max_speed: f32,
    /// Cap on the blended force
    pub max_force: f32,
    pub max_separation_force: f32,
    pub max_alignment_force: f32,
    pub max_cohesion_force: f32,
}

impl Default for BoidsParams {
    fn default() -> Self {
        Self {
            view_radius: 10.0,
            separation_radius: 3.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            max_speed: 5.0,
            max_force: 8.0,
            max_separation_force: 8.0,
            max_alignment_force: 5.0,
            max_cohesion_force: 5.0,
        }
    }
}

/// Snapshot of a nearby same-species entity
///
/// Built fresh every tick by flock registration. It is a copy: holding one
/// says nothing about whether the source entity still exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Threat (prey) or hunt target (predator) the neighbour is reacting to
    pub shared_target: Option<Vec3>,
}

impl Neighbor {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            shared_target: None,
        }
    }

    pub fn with_shared_target(mut self, target: Vec3) -> Self {
        self.shared_target = Some(target);
        self
    }

    pub fn has_shared_target(&self) -> bool {
        self.shared_target.is_some()
    }
}

/// The clamped sub-forces and their blend, for inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoidsForces {
    pub separation: Vec3,
    pub alignment: Vec3,
    pub cohesion: Vec3,
    pub total: Vec3,
}

/// Combined boids steering force
pub fn compute(self_pos: Vec3, self_vel: Vec3, neighbors: &[Neighbor], params: &BoidsParams) -> Vec3 {
    compute_detailed(self_pos, self_vel, neighbors, params).total
}

/// Combined force plus the individual clamped sub-forces
pub fn compute_detailed(
    self_pos: Vec3,
    self_vel: Vec3,
    neighbors: &[Neighbor],
    params: &BoidsParams,
) -> BoidsForces {
    let sep = limit(
        separation(self_pos, neighbors, params.separation_radius),
        params.max_separation_force,
    );
    let ali = limit(
        alignment(self_pos, self_vel, neighbors, params),
        params.max_alignment_force,
    );
    let coh = limit(
        cohesion(self_pos, self_vel, neighbors, params),
        params.max_cohesion_force,
    );

    let blended = sep * params.separation_weight
        + ali * params.alignment_weight
        + coh * params.cohesion_weight;

    BoidsForces {
        separation: sep,
        alignment: ali,
        cohesion: coh,
        total: limit(blended, params.max_force),
    }
}

/// Inverse-square repulsion from neighbours inside the separation radius
///
/// Coincident neighbours have no direction to push along and are skipped.
pub fn separation(self_pos: Vec3, neighbors: &[Neighbor], separation_radius: f32) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0u32;

    for n in neighbors {
        let away = self_pos - n.position;
        let dist = away.length();
        if dist > ZERO_LENGTH && dist < separation_radius {
            sum += normalize_or_zero(away) / (dist * dist);
            count += 1;
        }
    }

    if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    }
}

/// Steer toward the average heading of visible neighbours
pub fn alignment(self_pos: Vec3, self_vel: Vec3, neighbors: &[Neighbor], params: &BoidsParams) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0u32;

    for n in neighbors {
        if self_pos.distance(n.position) < params.view_radius {
            sum += n.velocity;
            count += 1;
        }
    }

    if count == 0 {
        return Vec3::ZERO;
    }

    let desired = normalize_or_zero(sum / count as f32) * params.max_speed;
    desired - self_vel
}

/// Steer toward the centre of visible neighbours
pub fn cohesion(self_pos: Vec3, self_vel: Vec3, neighbors: &[Neighbor], params: &BoidsParams) -> Vec3 {
    let mut center = Vec3::ZERO;
    let mut count = 0u32;

    for n in neighbors {
        if self_pos.distance(n.position) < params.view_radius {
            center += n.position;
            count += 1;
        }
    }

    if count == 0 {
        return Vec3::ZERO;
    }

    let center = center / count as f32;
    let desired = normalize_or_zero(center - self_pos) * params.max_speed;
    desired - self_vel
}
