//! Villager phase: one job step per villager

use crate::core::error::{EmberError, Result};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::jobs::{JobContext, JobEvent, JobKind};

/// Run every villager's job for one tick
pub fn update_villagers(world: &mut World) -> Vec<JobEvent> {
    let mut events = Vec::new();
    let village_center = world.village_center();
    let dt = world.clock.delta();
    let World {
        villagers,
        facilities,
        builds,
        collectibles,
        field,
        generation,
        ids,
        config,
        ..
    } = world;

    let mut ctx = JobContext {
        facilities,
        builds,
        collectibles,
        field,
        generation,
        ids,
        jobs: &config.jobs,
        facility_config: &config.facilities,
        generation_config: &config.generation,
        dt,
        village_center,
        events: &mut events,
    };
    for villager in villagers.iter_mut() {
        villager.work(&mut ctx);
    }
    events
}

/// Move a villager to another profession
///
/// Claims and requests held by the old job are released first.
pub fn change_job(world: &mut World, villager: EntityId, kind: JobKind) -> Result<Vec<JobEvent>> {
    let mut events = Vec::new();
    let village_center = world.village_center();
    let dt = world.clock.delta();
    let World {
        villagers,
        facilities,
        builds,
        collectibles,
        field,
        generation,
        ids,
        config,
        ..
    } = world;

    let target = villagers
        .iter_mut()
        .find(|v| v.id == villager)
        .ok_or(EmberError::EntityNotFound(villager))?;
    let mut ctx = JobContext {
        facilities,
        builds,
        collectibles,
        field,
        generation,
        ids,
        jobs: &config.jobs,
        facility_config: &config.facilities,
        generation_config: &config.generation,
        dt,
        village_center,
        events: &mut events,
    };
    target.change_job(kind, &mut ctx);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::FacilityType;
    use crate::core::config::SimulationConfig;

    #[test]
    fn test_change_job_unknown_villager() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        let err = change_job(&mut world, EntityId(99), JobKind::Cook).unwrap_err();
        assert!(matches!(err, EmberError::EntityNotFound(EntityId(99))));
    }

    #[test]
    fn test_change_job_keeps_stamina() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        let id = world.spawn_villager(JobKind::Gatherer);
        world.villagers[0].job.core_mut().stamina.current = 42.0;

        change_job(&mut world, id, JobKind::Smith).unwrap();

        let v = world.villager(id).unwrap();
        assert_eq!(v.job.kind(), JobKind::Smith);
        assert_eq!(v.job.core().stamina.current, 42.0);
    }

    #[test]
    fn test_villagers_ask_for_missing_facilities() {
        let mut world = World::empty(SimulationConfig::default(), 1);
        world.spawn_villager(JobKind::Farmer);
        let events = update_villagers(&mut world);
        assert!(world.builds.is_requested(FacilityType::Farm));
        assert_eq!(events.len(), 1);
    }
}
