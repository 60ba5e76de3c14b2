//! Property tests for the steering kernel and stamina curve

use ember_hollow::entity::vitals::stamina_gated_max_speed;
use ember_hollow::steering::boids::{compute_detailed, separation, BoidsParams, Neighbor};
use ember_hollow::steering::{compute, EscapeAi, EscapeParams, SteeringInput};
use glam::Vec3;
use proptest::prelude::*;

const EPS: f32 = 1e-3;

fn vec3(range: f32) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range).prop_map(|(x, z)| Vec3::new(x, 0.0, z))
}

fn neighbors(range: f32) -> impl Strategy<Value = Vec<Neighbor>> {
    prop::collection::vec((vec3(range), vec3(8.0)).prop_map(|(p, v)| Neighbor::new(p, v)), 0..12)
}

proptest! {
    #[test]
    fn separation_zero_when_nobody_inside_radius(
        raw in neighbors(30.0),
        radius in 0.5f32..5.0,
    ) {
        // Push every neighbour to at least `radius` away
        let pushed: Vec<Neighbor> = raw
            .into_iter()
            .map(|n| {
                let dir = if n.position.length() > 1e-3 { n.position.normalize() } else { Vec3::X };
                Neighbor::new(dir * (radius + n.position.length()), n.velocity)
            })
            .collect();
        prop_assert_eq!(separation(Vec3::ZERO, &pushed, radius), Vec3::ZERO);
    }

    #[test]
    fn every_stage_is_clamped(
        position in vec3(20.0),
        velocity in vec3(10.0),
        others in neighbors(20.0),
        max_force in 0.1f32..10.0,
        max_sub in 0.1f32..10.0,
    ) {
        let params = BoidsParams {
            max_force,
            max_separation_force: max_sub,
            max_alignment_force: max_sub,
            max_cohesion_force: max_sub,
            ..BoidsParams::default()
        };
        let f = compute_detailed(position, velocity, &others, &params);
        prop_assert!(f.total.length() <= max_force + EPS);
        prop_assert!(f.separation.length() <= max_sub + EPS);
        prop_assert!(f.alignment.length() <= max_sub + EPS);
        prop_assert!(f.cohesion.length() <= max_sub + EPS);
        prop_assert!(f.total.is_finite());
    }

    #[test]
    fn escape_without_threat_is_plain_boids(
        position in vec3(20.0),
        velocity in vec3(10.0),
        others in neighbors(20.0),
    ) {
        let params = BoidsParams::default();
        let ai = EscapeAi::new(EscapeParams::default());
        let input = SteeringInput {
            position,
            velocity,
            neighbors: &others,
            params: &params,
            dt: 1.0 / 60.0,
        };
        prop_assert_eq!(ai.update(&input), compute(position, velocity, &others, &params));
    }

    #[test]
    fn stamina_curve_monotonic(
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
        min in 0.0f32..3.0,
        extra in 0.0f32..10.0,
    ) {
        let base = min + extra;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(stamina_gated_max_speed(lo, min, base) <= stamina_gated_max_speed(hi, min, base) + 1e-5);
    }
}

#[test]
fn stamina_curve_endpoints() {
    assert!((stamina_gated_max_speed(0.0, 1.5, 6.0) - 1.5).abs() < 1e-6);
    assert!((stamina_gated_max_speed(1.0, 1.5, 6.0) - 6.0).abs() < 1e-6);
}
