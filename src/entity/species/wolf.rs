//! Wolf controller - the predator exemplar
//!
//! Wolves patrol their home range by day and hunt deer in the evening and
//! at night. Damage is not applied here: the controller reports an
//! [`AttackEvent`] and the wildlife pass applies all of them once every
//! animal has moved.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::calendar::DayPhase;
use crate::core::config::WolfConfig;
use crate::core::types::{EntityId, Species};
use crate::entity::animal::{Animal, AnimalState, RosterEntry};
use crate::entity::vitals::stamina_gated_max_speed;
use crate::spatial::{IndexedEntry, SpatialIndex};
use crate::steering::{BoidsParams, SteeringInput};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WolfState {
    /// Deer being chased, resolved against the roster each tick
    pub target: Option<EntityId>,
    pub attack_cooldown: f32,
    threat_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f32,
}

fn is_deer(e: &IndexedEntry<RosterEntry>) -> bool {
    e.data.species == Species::Deer
}

/// Pursuit speed multiplier for a target
///
/// Presses the advantage on a tired target and gives a catch-up boost that
/// grows with distance.
pub fn pursuit_boost(target_stamina_ratio: f32, distance: f32, config: &WolfConfig) -> f32 {
    let weak = if target_stamina_ratio < config.weak_target_threshold {
        config.weak_target_boost
    } else {
        1.0
    };
    let span = (config.catchup_far - config.catchup_near).max(f32::EPSILON);
    let t = ((distance - config.catchup_near) / span).clamp(0.0, 1.0);
    weak * (1.0 + config.catchup_boost * t)
}

/// Pick a target: keep our own, else adopt the pack's, else look around
fn acquire_target(
    state: &mut WolfState,
    position: Vec3,
    gossip: Option<Vec3>,
    roster: &SpatialIndex<RosterEntry>,
    config: &WolfConfig,
) {
    if state.target.is_some() {
        return;
    }
    if let Some(shared) = gossip {
        if let Some(deer) = roster.nearest(shared, Some(config.target_match_radius), &[], is_deer) {
            state.target = Some(deer.id);
            return;
        }
    }
    if let Some(deer) = roster.nearest(position, Some(config.alert_range), &[], is_deer) {
        state.target = Some(deer.id);
    }
}

/// One tick of wolf behaviour
pub fn update_wolf<R: Rng>(
    animal: &mut Animal,
    roster: &SpatialIndex<RosterEntry>,
    config: &WolfConfig,
    phase: DayPhase,
    dt: f32,
    bounds: (Vec3, Vec3),
    rng: &mut R,
) -> Option<AttackEvent> {
    let AnimalState::Wolf(state) = &mut animal.state else {
        return None;
    };

    state.attack_cooldown -= dt;

    if phase.is_dark() {
        state.threat_timer -= dt;
        if state.threat_timer <= 0.0 {
            state.threat_timer = config.threat_check_interval;
            let gossip = animal.neighbors.iter().find_map(|n| n.shared_target);
            acquire_target(state, animal.position, gossip, roster, config);
        }
    } else {
        state.target = None;
    }

    // Resolve the target; drop it once it is gone or out of reach
    let chase = state.target.and_then(|id| {
        roster
            .get(id)
            .filter(|e| e.position.distance(animal.position) <= config.give_up_range)
    });
    match chase {
        Some(entry) => animal.ai.set_shared_target(entry.position),
        None => {
            state.target = None;
            animal.ai.clear_shared_target();
        }
    }

    let gated = stamina_gated_max_speed(animal.stamina.ratio(), config.min_max_speed, config.base_max_speed);
    let max_speed = match chase {
        Some(entry) => {
            let distance = entry.position.distance(animal.position);
            gated * pursuit_boost(entry.data.stamina_ratio, distance, config)
        }
        None => gated,
    };

    let mut attack = None;
    if let Some(entry) = chase {
        if entry.position.distance(animal.position) <= config.attack_range && state.attack_cooldown <= 0.0 {
            state.attack_cooldown = config.attack_interval;
            attack = Some(AttackEvent {
                attacker: animal.id,
                target: entry.id,
                damage: config.attack_damage,
            });
        }
    }

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
    let force = animal.ai.update(&input, rng);

    let hunting = chase.is_some();
    animal.integrate(force, max_speed, dt, bounds);
    animal.update_stamina(&config.stamina, config.base_max_speed, hunting, dt);
    attack
}
