//! Escape AI: flocking prey that scatters away from a shared threat

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::math::{limit, normalize_or_zero};
use crate::steering::boids::{self, BoidsParams};
use crate::steering::SteeringInput;

/// Panic tuning applied while a threat is set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeParams {
    /// Replaces the archetype separation weight
    pub separation_weight: f32,
    /// Replaces the archetype cohesion weight (herds loosen when fleeing)
    pub cohesion_weight: f32,
    /// Multiplies the archetype alignment weight
    pub alignment_scale: f32,
    /// Flee force ramps up inside this distance from the threat
    pub flee_radius: f32,
    pub flee_max_force: f32,
    /// Fraction of the flee force applied at or beyond the flee radius
    pub min_flee_ratio: f32,
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            separation_weight: 1.2,
            cohesion_weight: 0.4,
            alignment_scale: 1.3,
            flee_radius: 20.0,
            flee_max_force: 14.0,
            min_flee_ratio: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeAi {
    pub params: EscapeParams,
    threat: Option<Vec3>,
}

impl EscapeAi {
    pub fn new(params: EscapeParams) -> Self {
        Self { params, threat: None }
    }

    pub fn threat(&self) -> Option<Vec3> {
        self.threat
    }

    pub fn has_threat(&self) -> bool {
        self.threat.is_some()
    }

    pub fn set_threat(&mut self, position: Vec3) {
        self.threat = Some(position);
    }

    pub fn clear_threat(&mut self) {
        self.threat = None;
    }

    /// Boids params with the escape overrides applied
    pub fn escape_params(&self, base: &BoidsParams) -> BoidsParams {
        BoidsParams {
            separation_weight: self.params.separation_weight,
            cohesion_weight: self.params.cohesion_weight,
            alignment_weight: base.alignment_weight * self.params.alignment_scale,
            ..*base
        }
    }

    /// Steering force for this tick
    ///
    /// Without a threat this is exactly the boids kernel on `input.params`.
    pub fn update(&self, input: &SteeringInput<'_>) -> Vec3 {
        let Some(threat) = self.threat else {
            return boids::compute(input.position, input.velocity, input.neighbors, input.params);
        };

        let params = self.escape_params(input.params);
        let flock = boids::compute(input.position, input.velocity, input.neighbors, &params);
        flock + self.flee_force(input.position, input.velocity, threat, params.max_speed)
    }

    /// Steering away from the threat, scaled by proximity
    pub fn flee_force(&self, position: Vec3, velocity: Vec3, threat: Vec3, max_speed: f32) -> Vec3 {
        let away = position - threat;
        let dist = away.length();
        let desired = normalize_or_zero(away) * max_speed;
        let steer = limit(desired - velocity, self.params.flee_max_force);
        steer * self.flee_ratio(dist)
    }

    /// 1.0 at the threat, falling linearly to `min_flee_ratio` at the flee radius
    pub fn flee_ratio(&self, distance: f32) -> f32 {
        let min = self.params.min_flee_ratio;
        if self.params.flee_radius <= 0.0 || distance >= self.params.flee_radius {
            return min;
        }
        let closeness = 1.0 - distance / self.params.flee_radius;
        min + (1.0 - min) * closeness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::boids::Neighbor;

    fn input<'a>(neighbors: &'a [Neighbor], params: &'a BoidsParams) -> SteeringInput<'a> {
        SteeringInput {
            position: Vec3::ZERO,
            velocity: Vec3::new(0.5, 0.0, 0.0),
            neighbors,
            params,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_no_threat_is_pure_boids() {
        let params = BoidsParams::default();
        let neighbors = [
            Neighbor::new(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 2.0)),
            Neighbor::new(Vec3::new(-3.0, 0.0, 2.0), Vec3::new(1.0, 0.0, 0.0)),
        ];
        let ai = EscapeAi::new(EscapeParams::default());
        let input = input(&neighbors, &params);
        assert_eq!(
            ai.update(&input),
            boids::compute(input.position, input.velocity, &neighbors, &params)
        );
    }

    #[test]
    fn test_threat_pushes_away() {
        let params = BoidsParams::default();
        let mut ai = EscapeAi::new(EscapeParams::default());
        ai.set_threat(Vec3::new(5.0, 0.0, 0.0));
        let force = ai.update(&input(&[], &params));
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_flee_ratio_ramps() {
        let ai = EscapeAi::new(EscapeParams::default());
        assert!((ai.flee_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((ai.flee_ratio(20.0) - 0.2).abs() < 1e-6);
        assert!((ai.flee_ratio(100.0) - 0.2).abs() < 1e-6);
        assert!((ai.flee_ratio(10.0) - 0.6).abs() < 1e-6);
        assert!(ai.flee_ratio(5.0) > ai.flee_ratio(15.0));
    }

    #[test]
    fn test_closer_threat_flees_harder() {
        let ai = EscapeAi::new(EscapeParams::default());
        let near = ai.flee_force(Vec3::ZERO, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 6.0);
        let far = ai.flee_force(Vec3::ZERO, Vec3::ZERO, Vec3::new(18.0, 0.0, 0.0), 6.0);
        assert!(near.length() > far.length());
    }

    #[test]
    fn test_escape_params_override_weights() {
        let base = BoidsParams::default();
        let ai = EscapeAi::new(EscapeParams::default());
        let p = ai.escape_params(&base);
        assert!((p.cohesion_weight - 0.4).abs() < 1e-6);
        assert!((p.separation_weight - 1.2).abs() < 1e-6);
        assert!((p.alignment_weight - base.alignment_weight * 1.3).abs() < 1e-6);
        assert_eq!(p.max_speed, base.max_speed);
    }

    #[test]
    fn test_clear_threat() {
        let mut ai = EscapeAi::new(EscapeParams::default());
        ai.set_threat(Vec3::ONE);
        assert!(ai.has_threat());
        ai.clear_threat();
        assert_eq!(ai.threat(), None);
    }
}
