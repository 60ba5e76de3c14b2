//! Simulation configuration with documented constants
//!
//! Every tunable of the simulation lives here. The defaults are the tuned
//! values; a TOML file may override any subset of them (all sections use
//! `#[serde(default)]`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::city::items::ItemType;
use crate::core::error::{EmberError, Result};
use crate::jobs::JobKind;
use crate::steering::{AttackParams, BoidsParams, EscapeParams};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub clock: ClockConfig,
    pub deer: DeerConfig,
    pub wolf: WolfConfig,
    pub jobs: JobConfig,
    pub facilities: FacilityConfig,
    pub generation: GenerationConfig,

    /// Minimum animal count before flock registration runs on rayon
    ///
    /// Registration only reads the roster, so it is safe to split; below
    /// this count thread overhead exceeds the benefit.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            clock: ClockConfig::default(),
            deer: DeerConfig::default(),
            wolf: WolfConfig::default(),
            jobs: JobConfig::default(),
            facilities: FacilityConfig::default(),
            generation: GenerationConfig::default(),
            parallel_threshold: 512,
        }
    }
}

// === WORLD LAYOUT ===

/// Starting stock entry for the village storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub item: ItemType,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed world seed; a random one is drawn (and logged) when absent
    pub seed: Option<u64>,
    pub width: usize,
    pub height: usize,
    /// World units per field cell
    pub cell_size: f32,

    /// Noise sample spacing per cell
    pub noise_scale: f64,
    /// Noise below this value grows trees
    pub tree_max: f64,
    /// Narrow mid band that grows grass
    pub grass_min: f64,
    pub grass_max: f64,
    /// Noise above this value is rock
    pub rock_min: f64,

    /// Half-size (in cells) of the central village zone
    ///
    /// Territory stamps never touch it, and fall-through cells inside it are
    /// buildable.
    pub village_radius: usize,
    pub territory_stamps_min: u32,
    pub territory_stamps_max: u32,
    /// Each of wolf/deer is raised to at least this many stamps
    pub min_territories_per_species: u32,
    pub stamp_size_min: usize,
    pub stamp_size_max: usize,
    /// Probability that a cell inside a stamp is skipped
    pub stamp_perforation: f32,

    /// Probability that a terrain cell starts with its collectible
    pub tree_density: f32,
    pub rock_density: f32,
    pub grass_density: f32,
    pub tree_amount: u32,
    pub rock_amount: u32,
    pub grass_amount: u32,
    pub carcass_amount: u32,

    pub deer_count: usize,
    pub wolf_count: usize,
    pub villagers: Vec<JobKind>,
    pub initial_stock: Vec<StockEntry>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            width: 50,
            height: 50,
            cell_size: 4.0,

            noise_scale: 0.1,
            tree_max: -0.2,
            grass_min: 0.05,
            grass_max: 0.12,
            rock_min: 0.4,

            village_radius: 5,
            territory_stamps_min: 6,
            territory_stamps_max: 10,
            min_territories_per_species: 3,
            stamp_size_min: 3,
            stamp_size_max: 8,
            stamp_perforation: 0.2,

            tree_density: 0.7,
            rock_density: 0.6,
            grass_density: 0.5,
            tree_amount: 4,
            rock_amount: 6,
            grass_amount: 3,
            carcass_amount: 3,

            deer_count: 12,
            wolf_count: 4,
            villagers: vec![
                JobKind::Gatherer,
                JobKind::Gatherer,
                JobKind::Builder,
                JobKind::Cook,
                JobKind::Farmer,
                JobKind::Smith,
            ],
            initial_stock: vec![
                StockEntry { item: ItemType::Wood, count: 12 },
                StockEntry { item: ItemType::Stone, count: 10 },
                StockEntry { item: ItemType::Grass, count: 6 },
                StockEntry { item: ItemType::Grain, count: 4 },
            ],
        }
    }
}

// === CLOCK ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed tick rate; one tick advances time by 1 / target_fps seconds
    pub target_fps: f32,
    pub day_length_seconds: f32,
    /// Where in the day the world starts (0 = dawn)
    pub start_fraction: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            day_length_seconds: 240.0,
            start_fraction: 0.0,
        }
    }
}

impl ClockConfig {
    pub fn delta(&self) -> f32 {
        1.0 / self.target_fps
    }
}

// === WILDLIFE ===

/// Stamina economy shared by animal species
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalStaminaParams {
    pub max: f32,
    /// Drain per second at full base speed
    pub drain_per_second: f32,
    /// Drain multiplier while fleeing or hunting
    pub exertion_multiplier: f32,
    /// Recovery per second while (almost) stationary
    pub recovery_per_second: f32,
    /// Below this fraction of base speed the animal counts as resting
    pub rest_speed_fraction: f32,
}

impl Default for AnimalStaminaParams {
    fn default() -> Self {
        Self {
            max: 100.0,
            drain_per_second: 5.0,
            exertion_multiplier: 2.0,
            recovery_per_second: 8.0,
            rest_speed_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeerConfig {
    pub boids: BoidsParams,
    pub escape: EscapeParams,
    pub stamina: AnimalStaminaParams,
    pub max_health: f32,

    /// Speed cap when rested and calm
    pub base_max_speed: f32,
    /// Speed cap when rested and fleeing
    pub flee_max_speed: f32,
    /// Speed cap when exhausted
    pub min_max_speed: f32,

    pub flock_radius: f32,
    pub threat_check_interval: f32,
    pub alert_range: f32,
    /// Threat is forgotten beyond this distance
    pub clear_range: f32,

    pub idle_chance: f32,
    pub idle_time_min: f32,
    pub idle_time_max: f32,
    /// Deceleration while idle, fraction of velocity per second
    pub idle_brake: f32,

    pub wander_interval_min: f32,
    pub wander_interval_max: f32,
    /// Max wander heading change per perturbation (radians)
    pub wander_turn: f32,
    pub wander_strength: f32,
    pub jitter_strength: f32,
    pub flee_wander_scale: f32,
    pub flee_jitter_scale: f32,
}

impl Default for DeerConfig {
    fn default() -> Self {
        Self {
            boids: BoidsParams {
                view_radius: 12.0,
                separation_radius: 3.5,
                separation_weight: 1.6,
                alignment_weight: 1.0,
                cohesion_weight: 0.9,
                max_speed: 6.0,
                max_force: 8.0,
                max_separation_force: 8.0,
                max_alignment_force: 5.0,
                max_cohesion_force: 5.0,
            },
            escape: EscapeParams::default(),
            stamina: AnimalStaminaParams::default(),
            max_health: 40.0,

            base_max_speed: 6.0,
            flee_max_speed: 10.0,
            min_max_speed: 1.5,

            flock_radius: 15.0,
            threat_check_interval: 0.25,
            alert_range: 18.0,
            clear_range: 32.0,

            idle_chance: 0.25,
            idle_time_min: 1.5,
            idle_time_max: 4.0,
            idle_brake: 3.0,

            wander_interval_min: 0.6,
            wander_interval_max: 1.8,
            wander_turn: 1.2,
            wander_strength: 2.0,
            jitter_strength: 0.8,
            flee_wander_scale: 0.3,
            flee_jitter_scale: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WolfConfig {
    pub boids: BoidsParams,
    pub attack: AttackParams,
    pub stamina: AnimalStaminaParams,
    pub max_health: f32,

    pub base_max_speed: f32,
    pub min_max_speed: f32,

    pub flock_radius: f32,
    pub threat_check_interval: f32,
    pub alert_range: f32,
    /// Target is dropped beyond this distance
    pub give_up_range: f32,
    /// A gossiped target position resolves to a deer within this radius
    pub target_match_radius: f32,

    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_interval: f32,

    /// Below this target stamina ratio the pack presses the advantage
    pub weak_target_threshold: f32,
    pub weak_target_boost: f32,
    /// Catch-up boost ramps from 0 at `catchup_near` to full at `catchup_far`
    pub catchup_near: f32,
    pub catchup_far: f32,
    pub catchup_boost: f32,
}

impl Default for WolfConfig {
    fn default() -> Self {
        Self {
            boids: BoidsParams {
                view_radius: 15.0,
                separation_radius: 4.0,
                separation_weight: 1.4,
                alignment_weight: 0.8,
                cohesion_weight: 0.7,
                max_speed: 7.5,
                max_force: 9.0,
                max_separation_force: 9.0,
                max_alignment_force: 5.0,
                max_cohesion_force: 5.0,
            },
            attack: AttackParams::default(),
            stamina: AnimalStaminaParams {
                max: 120.0,
                drain_per_second: 4.0,
                exertion_multiplier: 1.5,
                recovery_per_second: 6.0,
                rest_speed_fraction: 0.1,
            },
            max_health: 60.0,

            base_max_speed: 7.5,
            min_max_speed: 2.0,

            flock_radius: 18.0,
            threat_check_interval: 0.25,
            alert_range: 22.0,
            give_up_range: 40.0,
            target_match_radius: 6.0,

            attack_range: 1.5,
            attack_damage: 12.0,
            attack_interval: 1.2,

            weak_target_threshold: 0.3,
            weak_target_boost: 1.2,
            catchup_near: 4.0,
            catchup_far: 20.0,
            catchup_boost: 0.25,
        }
    }
}

// === JOBS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub max_stamina: f32,
    pub work_power: f32,
    /// Walking speed in world units per second
    pub move_speed: f32,
    pub arrive_distance: f32,
    /// Stamina spent per second of walking
    pub move_stamina_cost: f32,
    /// Stamina spent per second of gathering/building/producing
    pub work_stamina_cost: f32,

    /// Percent per tick at work power 1.0
    pub gather_rate: f32,
    /// Percent per tick at level 1
    pub build_rate: f32,
    pub craft_rate: f32,
    pub farm_rate: f32,
    /// Extra rate per level above 1, as a fraction of the base rate
    pub level_rate_bonus: f32,

    pub cooldown_seconds: f32,
    pub farm_yield: u32,
    pub experience_per_level: u32,
    pub max_level: u32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_stamina: 100.0,
            work_power: 1.0,
            move_speed: 4.0,
            arrive_distance: 1.0,
            move_stamina_cost: 1.5,
            work_stamina_cost: 2.5,

            gather_rate: 2.5,
            build_rate: 1.0,
            craft_rate: 1.5,
            farm_rate: 0.8,
            level_rate_bonus: 0.25,

            cooldown_seconds: 2.0,
            farm_yield: 3,
            experience_per_level: 5,
            max_level: 5,
        }
    }
}

impl JobConfig {
    /// Production rate multiplier for a worker level
    pub fn level_factor(&self, level: u32) -> f32 {
        1.0 + self.level_rate_bonus * level.saturating_sub(1) as f32
    }
}

// === FACILITIES ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Stamina restored per tick by a rest house, indexed by level - 1
    pub refresh_recovery: Vec<f32>,
    pub max_level: u32,
    /// Seconds between workshop order checks
    pub order_interval_seconds: f32,
    pub max_pending_orders: usize,
    /// Workshops stop ordering once storage holds this many products
    pub meal_target: u32,
    pub tool_target: u32,
    pub storage_capacity: u32,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            refresh_recovery: vec![0.5, 0.8, 1.2],
            max_level: 3,
            order_interval_seconds: 10.0,
            max_pending_orders: 2,
            meal_target: 10,
            tool_target: 5,
            storage_capacity: 200,
        }
    }
}

impl FacilityConfig {
    /// Recovery per tick for a rest house of the given level
    pub fn recovery_for_level(&self, level: u32) -> f32 {
        let idx = (level.max(1) as usize - 1).min(self.refresh_recovery.len().saturating_sub(1));
        self.refresh_recovery.get(idx).copied().unwrap_or(0.0)
    }
}

// === GENERATION ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub tree_regrow_seconds: f32,
    pub rock_regrow_seconds: f32,
    pub grass_regrow_seconds: f32,
    pub deer_respawn_seconds: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tree_regrow_seconds: 60.0,
            rock_regrow_seconds: 90.0,
            grass_regrow_seconds: 30.0,
            deer_respawn_seconds: 120.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if w.width == 0 || w.height == 0 || w.cell_size <= 0.0 {
            return Err(invalid("world dimensions and cell_size must be positive"));
        }
        if w.village_radius * 2 >= w.width.min(w.height) {
            return Err(invalid(format!(
                "village_radius ({}) leaves no room for territories on a {}x{} field",
                w.village_radius, w.width, w.height
            )));
        }
        if w.grass_min >= w.grass_max {
            return Err(invalid(format!(
                "grass_min ({}) should be < grass_max ({})",
                w.grass_min, w.grass_max
            )));
        }
        if w.tree_max >= w.grass_min || w.grass_max >= w.rock_min {
            return Err(invalid("noise bands must be ordered tree < grass < rock"));
        }
        if w.stamp_size_min == 0 || w.stamp_size_min > w.stamp_size_max {
            return Err(invalid("stamp_size_min must be in 1..=stamp_size_max"));
        }
        if w.territory_stamps_min > w.territory_stamps_max {
            return Err(invalid("territory_stamps_min should be <= territory_stamps_max"));
        }

        if self.clock.target_fps <= 0.0 || self.clock.day_length_seconds <= 0.0 {
            return Err(invalid("target_fps and day_length_seconds must be positive"));
        }

        for (name, boids) in [("deer", &self.deer.boids), ("wolf", &self.wolf.boids)] {
            if boids.separation_radius <= 0.0 || boids.view_radius < boids.separation_radius {
                return Err(invalid(format!(
                    "{name} boids: need 0 < separation_radius <= view_radius"
                )));
            }
        }
        if self.deer.min_max_speed > self.deer.base_max_speed
            || self.deer.base_max_speed > self.deer.flee_max_speed
        {
            return Err(invalid("deer speeds must be ordered min <= base <= flee"));
        }
        if self.wolf.min_max_speed > self.wolf.base_max_speed {
            return Err(invalid("wolf min_max_speed should be <= base_max_speed"));
        }
        if self.deer.alert_range >= self.deer.clear_range {
            return Err(invalid("deer alert_range should be < clear_range"));
        }

        if self.jobs.max_stamina <= 0.0 || self.jobs.max_level == 0 {
            return Err(invalid("jobs.max_stamina and jobs.max_level must be positive"));
        }
        if self.facilities.refresh_recovery.is_empty()
            || self.facilities.refresh_recovery.iter().any(|r| *r <= 0.0)
        {
            return Err(invalid("refresh_recovery needs at least one positive rate"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> EmberError {
    EmberError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = SimulationConfig::from_toml_str(
            r#"
            parallel_threshold = 64

            [world]
            seed = 7
            deer_count = 3

            [wolf]
            attack_damage = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.deer_count, 3);
        assert_eq!(config.world.width, 50);
        assert!((config.wolf.attack_damage - 20.0).abs() < 1e-6);
        assert_eq!(config.parallel_threshold, 64);
    }

    #[test]
    fn test_villager_list_parses() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [world]
            villagers = ["Builder", "Smith"]
            "#,
        )
        .unwrap();
        assert_eq!(config.world.villagers, vec![JobKind::Builder, JobKind::Smith]);
    }

    #[test]
    fn test_rejects_unordered_noise_bands() {
        let mut config = SimulationConfig::default();
        config.world.grass_min = 0.5;
        config.world.grass_max = 0.2;
        assert!(matches!(config.validate(), Err(EmberError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_village() {
        let mut config = SimulationConfig::default();
        config.world.village_radius = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_toml() {
        let result = SimulationConfig::from_toml_str("world = 3");
        assert!(matches!(result, Err(EmberError::TomlError(_))));
    }

    #[test]
    fn test_recovery_for_level_clamps() {
        let config = FacilityConfig::default();
        assert!((config.recovery_for_level(1) - 0.5).abs() < 1e-6);
        assert!((config.recovery_for_level(3) - 1.2).abs() < 1e-6);
        assert!((config.recovery_for_level(9) - 1.2).abs() < 1e-6);
        assert!((config.recovery_for_level(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_level_factor() {
        let jobs = JobConfig::default();
        assert!((jobs.level_factor(1) - 1.0).abs() < 1e-6);
        assert!((jobs.level_factor(3) - 1.5).abs() < 1e-6);
    }
}
