//! Job strategy state machines
//!
//! Every villager owns exactly one [`Job`]. The simulation calls
//! [`Job::do_work`] once per tick; a step never blocks, it reports whether
//! it made progress, is stuck waiting on something, or finished a cycle.
//! Jobs hold facilities, requests and collectibles only by id and resolve
//! them through the [`JobContext`] on every step.

pub mod builder;
pub mod farmer;
pub mod gatherer;
pub mod machine;
pub mod materials;
pub mod rest;
pub mod workshop;

#[cfg(test)]
pub(crate) mod testing;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::{BuildManager, FacilityRegistry, FacilityType, ItemType};
use crate::core::config::{FacilityConfig, GenerationConfig, JobConfig};
use crate::core::math::step_toward;
use crate::core::types::{EntityId, IdAllocator};
use crate::entity::vitals::Stamina;
use crate::world::{CollectibleStore, FieldGrid, GenerationManager};

pub use builder::BuilderJob;
pub use farmer::FarmerJob;
pub use gatherer::GathererJob;
pub use rest::RestAction;
pub use workshop::WorkshopJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    Gatherer,
    Builder,
    Cook,
    Farmer,
    Smith,
}

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// Made progress, call again next tick
    Continue,
    /// Waiting on something outside the job (a facility, materials, a request)
    Blocked,
    /// Finished a work cycle
    Done,
}

/// Things a job did that the rest of the simulation may care about
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    BuildRequested {
        worker: EntityId,
        facility_type: FacilityType,
    },
    Delivered {
        worker: EntityId,
        item: ItemType,
        count: u32,
    },
    FacilityBuilt {
        worker: EntityId,
        facility: EntityId,
        facility_type: FacilityType,
        level: u32,
    },
    Crafted {
        worker: EntityId,
        workshop: EntityId,
        item: ItemType,
    },
    LeveledUp {
        worker: EntityId,
        level: u32,
    },
}

/// State every job carries, and hands on when the villager changes job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobCore {
    pub work_power: f32,
    pub stamina: Stamina,
    pub level: u32,
    pub experience: u32,
}

impl JobCore {
    pub fn new(config: &JobConfig) -> Self {
        Self {
            work_power: config.work_power,
            stamina: Stamina::full(config.max_stamina),
            level: 1,
            experience: 0,
        }
    }

    /// Rate multiplier from level and work power
    pub fn output_factor(&self, config: &JobConfig) -> f32 {
        config.level_factor(self.level) * self.work_power
    }

    /// Count a finished cycle; returns the new level if it went up
    pub fn gain_experience(&mut self, config: &JobConfig) -> Option<u32> {
        self.experience += 1;
        let per_level = config.experience_per_level.max(1);
        let level = (1 + self.experience / per_level).min(config.max_level);
        if level > self.level {
            self.level = level;
            Some(level)
        } else {
            None
        }
    }
}

/// The part of a villager a job moves around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerBody {
    pub id: EntityId,
    pub position: Vec3,
}

/// Everything a job step may read or change
pub struct JobContext<'a> {
    pub facilities: &'a mut FacilityRegistry,
    pub builds: &'a mut BuildManager,
    pub collectibles: &'a mut CollectibleStore,
    pub field: &'a mut FieldGrid,
    pub generation: &'a mut GenerationManager,
    pub ids: &'a mut IdAllocator,
    pub jobs: &'a JobConfig,
    pub facility_config: &'a FacilityConfig,
    pub generation_config: &'a GenerationConfig,
    pub dt: f32,
    pub village_center: Vec3,
    pub events: &'a mut Vec<JobEvent>,
}

impl JobContext<'_> {
    /// Ask builders for a facility and note who asked
    pub fn request_build(&mut self, worker: EntityId, facility_type: FacilityType) {
        self.builds.request(facility_type);
        self.events.push(JobEvent::BuildRequested {
            worker,
            facility_type,
        });
    }

    /// Ask builders to raise an existing facility a level
    pub fn request_upgrade(&mut self, worker: EntityId, facility_type: FacilityType, facility: EntityId) {
        self.builds.request_upgrade(facility_type, facility);
        self.events.push(JobEvent::BuildRequested {
            worker,
            facility_type,
        });
    }

    /// Move one tick toward `target`. Returns (moved, arrived).
    pub fn step_to(&self, body: &mut WorkerBody, target: Vec3) -> (bool, bool) {
        let step = self.jobs.move_speed * self.dt;
        let (next, arrived) = step_toward(body.position, target, step, self.jobs.arrive_distance);
        let moved = next != body.position;
        body.position = next;
        (moved, arrived)
    }

    /// Walk toward `target`, paying stamina for the distance
    ///
    /// Returns true once the worker stands at the target.
    pub fn walk(&self, core: &mut JobCore, body: &mut WorkerBody, target: Vec3) -> bool {
        let (moved, arrived) = self.step_to(body, target);
        if moved {
            core.stamina.drain(self.jobs.move_stamina_cost * self.dt);
        }
        arrived
    }

    /// Stamina cost of one tick of work
    pub fn exert(&self, core: &mut JobCore) {
        core.stamina.drain(self.jobs.work_stamina_cost * self.dt);
    }

    /// Log a finished cycle and level the worker up when due
    pub fn finish_cycle(&mut self, core: &mut JobCore, worker: EntityId) {
        if let Some(level) = core.gain_experience(self.jobs) {
            debug!(worker = worker.0, level, "Worker leveled up");
            self.events.push(JobEvent::LeveledUp { worker, level });
        }
    }

    /// Hand carried materials back to storage
    pub fn return_materials(&mut self, near: Vec3, ledger: &mut materials::MaterialLedger) {
        for (item, count) in ledger.drain_held() {
            let stored = self.deposit(near, item, count);
            if stored < count {
                debug!(?item, lost = count - stored, "Returned materials did not fit in storage");
            }
        }
    }

    /// Put items into the nearest storage; returns how many fit
    pub fn deposit(&mut self, near: Vec3, item: ItemType, count: u32) -> u32 {
        let Some(storage) = self.facilities.nearest_storage(near) else {
            return 0;
        };
        self.facilities
            .get_mut(storage)
            .and_then(|f| f.stockpile_mut())
            .map(|stock| stock.add(item, count))
            .unwrap_or(0)
    }
}

/// A villager's profession, with its own state machine
#[derive(Debug, Clone)]
pub enum Job {
    Gatherer(GathererJob),
    Builder(BuilderJob),
    Cook(WorkshopJob),
    Farmer(FarmerJob),
    Smith(WorkshopJob),
}

impl Job {
    pub fn new(kind: JobKind, config: &JobConfig) -> Self {
        Self::with_core(kind, JobCore::new(config))
    }

    pub fn with_core(kind: JobKind, core: JobCore) -> Self {
        match kind {
            JobKind::Gatherer => Job::Gatherer(GathererJob::new(core)),
            JobKind::Builder => Job::Builder(BuilderJob::new(core)),
            JobKind::Cook => Job::Cook(WorkshopJob::cook(core)),
            JobKind::Farmer => Job::Farmer(FarmerJob::new(core)),
            JobKind::Smith => Job::Smith(WorkshopJob::smith(core)),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Job::Gatherer(_) => JobKind::Gatherer,
            Job::Builder(_) => JobKind::Builder,
            Job::Cook(_) => JobKind::Cook,
            Job::Farmer(_) => JobKind::Farmer,
            Job::Smith(_) => JobKind::Smith,
        }
    }

    pub fn core(&self) -> &JobCore {
        match self {
            Job::Gatherer(j) => &j.core,
            Job::Builder(j) => &j.core,
            Job::Cook(j) | Job::Smith(j) => &j.core,
            Job::Farmer(j) => &j.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut JobCore {
        match self {
            Job::Gatherer(j) => &mut j.core,
            Job::Builder(j) => &mut j.core,
            Job::Cook(j) | Job::Smith(j) => &mut j.core,
            Job::Farmer(j) => &mut j.core,
        }
    }

    /// Name of the current state, for the debug snapshot
    pub fn state_name(&self) -> String {
        match self {
            Job::Gatherer(j) => format!("{:?}", j.state()),
            Job::Builder(j) => format!("{:?}", j.state()),
            Job::Cook(j) | Job::Smith(j) => format!("{:?}", j.state()),
            Job::Farmer(j) => format!("{:?}", j.state()),
        }
    }

    pub fn is_resting(&self) -> bool {
        match self {
            Job::Gatherer(j) => j.is_resting(),
            Job::Builder(j) => j.is_resting(),
            Job::Cook(j) | Job::Smith(j) => j.is_resting(),
            Job::Farmer(j) => j.is_resting(),
        }
    }

    pub fn do_work(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        match self {
            Job::Gatherer(j) => j.do_work(body, ctx),
            Job::Builder(j) => j.do_work(body, ctx),
            Job::Cook(j) | Job::Smith(j) => j.do_work(body, ctx),
            Job::Farmer(j) => j.do_work(body, ctx),
        }
    }

    /// Release everything the job holds before it is replaced
    pub fn on_change_job(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        match self {
            Job::Gatherer(j) => j.on_change_job(body, ctx),
            Job::Builder(j) => j.on_change_job(body, ctx),
            Job::Cook(j) | Job::Smith(j) => j.on_change_job(body, ctx),
            Job::Farmer(j) => j.on_change_job(body, ctx),
        }
    }

    /// Swap to a new profession, carrying stamina and work power over
    pub fn change_to(&mut self, kind: JobKind, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.on_change_job(body, ctx);
        let old = *self.core();
        let mut core = JobCore::new(ctx.jobs);
        core.stamina = old.stamina;
        core.work_power = old.work_power;
        *self = Job::with_core(kind, core);
        debug!(worker = body.id.0, ?kind, "Job changed");
    }
}
