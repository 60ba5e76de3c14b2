//! Stamina and health shared by animals and villagers

use serde::{Deserialize, Serialize};

/// Below this stamina ratio speed is squeezed toward the floor
pub const TIRED_RATIO: f32 = 0.2;
/// Share of the speed range reached at the tired ratio
const TIRED_SPEED_SHARE: f32 = 0.1;
/// Recovery that lands within this of max snaps to max
const FULL_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
}

impl Stamina {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.current <= 0.0
    }

    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn recover(&mut self, amount: f32) {
        self.current += amount;
        if self.current >= self.max - FULL_EPSILON {
            self.current = self.max;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, returns true if this blow was fatal
    pub fn damage(&mut self, amount: f32) -> bool {
        let was_alive = self.current > 0.0;
        self.current = (self.current - amount).max(0.0);
        was_alive && self.current <= 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Speed cap for a stamina ratio
///
/// Below [`TIRED_RATIO`] the ratio is compressed into the bottom tenth of
/// the range; above it the remainder is expanded to 0..1 and squared. The
/// result runs from `min_speed` at 0 to `base_speed` at 1 and never
/// decreases in between.
pub fn stamina_gated_max_speed(ratio: f32, min_speed: f32, base_speed: f32) -> f32 {
    let r = ratio.clamp(0.0, 1.0);
    let shaped = if r < TIRED_RATIO {
        r / TIRED_RATIO * TIRED_SPEED_SHARE
    } else {
        let t = (r - TIRED_RATIO) / (1.0 - TIRED_RATIO);
        TIRED_SPEED_SHARE + (1.0 - TIRED_SPEED_SHARE) * t * t
    };
    min_speed + (base_speed - min_speed) * shaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_curve_endpoints() {
        assert!((stamina_gated_max_speed(0.0, 1.5, 6.0) - 1.5).abs() < 1e-6);
        assert!((stamina_gated_max_speed(1.0, 1.5, 6.0) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_speed_curve_continuous_at_knee() {
        let below = stamina_gated_max_speed(TIRED_RATIO - 1e-5, 0.0, 10.0);
        let above = stamina_gated_max_speed(TIRED_RATIO, 0.0, 10.0);
        assert!((below - above).abs() < 1e-3);
    }

    #[test]
    fn test_tired_animals_slow_disproportionately() {
        // Half stamina gives well under half the speed range
        let half = stamina_gated_max_speed(0.5, 0.0, 10.0);
        assert!(half < 5.0);
    }

    #[test]
    fn test_stamina_recover_snaps_to_max() {
        let mut s = Stamina { current: 0.0, max: 100.0 };
        let mut ticks = 0;
        while !s.is_full() {
            s.recover(0.8);
            ticks += 1;
        }
        assert_eq!(ticks, 125);
        assert_eq!(s.current, 100.0);
    }

    #[test]
    fn test_stamina_drain_floors_at_zero() {
        let mut s = Stamina::full(10.0);
        s.drain(25.0);
        assert!(s.is_exhausted());
        assert_eq!(s.ratio(), 0.0);
    }

    #[test]
    fn test_health_fatal_blow_reported_once() {
        let mut h = Health::full(20.0);
        assert!(!h.damage(12.0));
        assert!(h.damage(12.0));
        assert!(!h.damage(12.0));
        assert!(h.is_dead());
    }
}
