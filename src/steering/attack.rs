//! Attack AI: territorial patrol that turns into a group pursuit

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::math::direction_from_angle;
use crate::steering::boids::{self, BoidsParams, Neighbor};
use crate::steering::{seek, SteeringInput};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackParams {
    /// Weight of the seek toward a hunt target
    pub target_seek_weight: f32,
    pub patrol_radius: f32,
    /// A patrol point closer than this counts as reached
    pub patrol_reach_distance: f32,
    /// Seconds before a new patrol point is picked regardless
    pub repath_interval: f32,
    pub patrol_cohesion_scale: f32,
    pub patrol_separation_scale: f32,
    pub patrol_alignment_scale: f32,
    pub patrol_seek_weight: f32,
}

impl Default for AttackParams {
    fn default() -> Self {
        Self {
            target_seek_weight: 1.3,
            patrol_radius: 14.0,
            patrol_reach_distance: 2.5,
            repath_interval: 8.0,
            patrol_cohesion_scale: 0.65,
            patrol_separation_scale: 1.05,
            patrol_alignment_scale: 1.05,
            patrol_seek_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackAi {
    pub params: AttackParams,
    target: Option<Vec3>,
    home: Option<Vec3>,
    patrol_point: Option<Vec3>,
    repath_timer: f32,
}

impl AttackAi {
    pub fn new(params: AttackParams) -> Self {
        Self {
            params,
            target: None,
            home: None,
            patrol_point: None,
            repath_timer: 0.0,
        }
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn set_target(&mut self, position: Vec3) {
        self.target = Some(position);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn home(&self) -> Option<Vec3> {
        self.home
    }

    pub fn set_home(&mut self, position: Vec3) {
        self.home = Some(position);
    }

    pub fn patrol_point(&self) -> Option<Vec3> {
        self.patrol_point
    }

    /// Boids params used while patrolling without a target
    ///
    /// Cohesion is damped so the pack does not ball up while it still moves
    /// as a group.
    pub fn patrol_params(&self, base: &BoidsParams) -> BoidsParams {
        BoidsParams {
            cohesion_weight: base.cohesion_weight * self.params.patrol_cohesion_scale,
            separation_weight: base.separation_weight * self.params.patrol_separation_scale,
            alignment_weight: base.alignment_weight * self.params.patrol_alignment_scale,
            ..*base
        }
    }

    /// Steering force for this tick
    pub fn update<R: Rng>(&mut self, input: &SteeringInput<'_>, rng: &mut R) -> Vec3 {
        if let Some(target) = self.target {
            let flock = boids::compute(input.position, input.velocity, input.neighbors, input.params);
            let chase = seek(
                input.position,
                input.velocity,
                target,
                input.params.max_speed,
                input.params.max_force,
            );
            return flock + chase * self.params.target_seek_weight;
        }

        let home = *self
            .home
            .get_or_insert_with(|| flock_centroid(input.position, input.neighbors));

        self.repath_timer -= input.dt;
        let needs_repath = match self.patrol_point {
            None => true,
            Some(point) => {
                self.repath_timer <= 0.0
                    || input.position.distance(point) < self.params.patrol_reach_distance
            }
        };
        if needs_repath {
            let angle = rng.gen_range(0.0..TAU);
            self.patrol_point = Some(home + direction_from_angle(angle) * self.params.patrol_radius);
            self.repath_timer = self.params.repath_interval;
        }

        let params = self.patrol_params(input.params);
        let flock = boids::compute(input.position, input.velocity, input.neighbors, &params);
        let patrol = match self.patrol_point {
            Some(point) => seek(input.position, input.velocity, point, params.max_speed, params.max_force),
            None => Vec3::ZERO,
        };
        flock + patrol * self.params.patrol_seek_weight
    }
}

/// Centre of the entity and its neighbours
pub fn flock_centroid(position: Vec3, neighbors: &[Neighbor]) -> Vec3 {
    let sum = neighbors.iter().fold(position, |acc, n| acc + n.position);
    sum / (neighbors.len() + 1) as f32
}
