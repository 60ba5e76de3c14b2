//! Game clock for fixed-timestep simulation
//!
//! A day is split into four equal phases (Morning, Noon, Evening, Night).
//! Wolves read the phase to decide whether they hunt.

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Quarter of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    Morning,
    Noon,
    Evening,
    Night,
}

impl DayPhase {
    /// Phase for a fraction of the day in [0, 1)
    pub fn from_fraction(fraction: f32) -> Self {
        let f = fraction.rem_euclid(1.0);
        match (f * 4.0) as u32 {
            0 => DayPhase::Morning,
            1 => DayPhase::Noon,
            2 => DayPhase::Evening,
            _ => DayPhase::Night,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, DayPhase::Evening | DayPhase::Night)
    }
}

/// Accumulating game time with a fixed per-tick delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    tick: Tick,
    elapsed: f64,
    delta: f32,
    day_length: f32,
}

impl GameClock {
    /// `delta` is seconds per tick, `day_length` seconds per day, and
    /// `start_fraction` where in the day the clock begins.
    pub fn new(delta: f32, day_length: f32, start_fraction: f32) -> Self {
        Self {
            tick: 0,
            elapsed: (start_fraction.clamp(0.0, 1.0) * day_length) as f64,
            delta,
            day_length,
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed += self.delta as f64;
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Seconds simulated per tick
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn current_day(&self) -> u64 {
        (self.elapsed / self.day_length as f64) as u64
    }

    /// Position within the current day in [0, 1)
    pub fn time_of_day(&self) -> f32 {
        let day = self.day_length as f64;
        ((self.elapsed % day) / day) as f32
    }

    pub fn phase(&self) -> DayPhase {
        DayPhase::from_fraction(self.time_of_day())
    }

    /// Progress through the current phase in [0, 1)
    pub fn phase_progress(&self) -> f32 {
        (self.time_of_day() * 4.0).fract()
    }

    pub fn day_length(&self) -> f32 {
        self.day_length
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 240.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_fraction() {
        assert_eq!(DayPhase::from_fraction(0.0), DayPhase::Morning);
        assert_eq!(DayPhase::from_fraction(0.24), DayPhase::Morning);
        assert_eq!(DayPhase::from_fraction(0.25), DayPhase::Noon);
        assert_eq!(DayPhase::from_fraction(0.6), DayPhase::Evening);
        assert_eq!(DayPhase::from_fraction(0.99), DayPhase::Night);
        assert_eq!(DayPhase::from_fraction(1.1), DayPhase::Morning);
    }

    #[test]
    fn test_clock_advances_by_delta() {
        let mut clock = GameClock::new(0.5, 8.0, 0.0);
        assert_eq!(clock.current_tick(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick(), 2);
        assert!((clock.elapsed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_phases_cycle_through_day() {
        // 8 second day, 2 seconds per phase, 0.5 seconds per tick
        let mut clock = GameClock::new(0.5, 8.0, 0.0);
        assert_eq!(clock.phase(), DayPhase::Morning);
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.phase(), DayPhase::Noon);
        for _ in 0..8 {
            clock.advance();
        }
        assert_eq!(clock.phase(), DayPhase::Night);
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.phase(), DayPhase::Morning);
        assert_eq!(clock.current_day(), 1);
    }

    #[test]
    fn test_phase_progress() {
        let mut clock = GameClock::new(0.5, 8.0, 0.0);
        clock.advance();
        assert!((clock.phase_progress() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_start_fraction() {
        let clock = GameClock::new(0.5, 8.0, 0.75);
        assert_eq!(clock.phase(), DayPhase::Night);
        assert!(clock.phase().is_dark());
    }
}
