//! Farmer - sows grass seed on a farm plot and hauls the grain home

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::city::{Facility, FacilityType, ItemType};
use crate::core::types::EntityId;
use crate::jobs::machine::{JobState, StateTrack};
use crate::jobs::materials::{fetch_step, FetchStatus, MaterialLedger};
use crate::jobs::rest::{rest_gate, RestAction};
use crate::jobs::{JobContext, JobCore, JobEvent, StepResult, WorkerBody};

const SEED: [(ItemType, u32); 1] = [(ItemType::Grass, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmerState {
    Waiting,
    GatheringSeed,
    MovingToFarm,
    Tending,
    Transporting,
    Cooldown,
    Resting,
}

impl JobState for FarmerState {
    const START: Self = FarmerState::Waiting;
    const REST: Self = FarmerState::Resting;
}

#[derive(Debug, Clone)]
pub struct FarmerJob {
    pub core: JobCore,
    track: StateTrack<FarmerState>,
    rest: RestAction,
    farm: Option<EntityId>,
    seed: MaterialLedger,
    growth: f32,
    /// Grain still to be stored
    harvest: u32,
    cooldown: f32,
}

impl FarmerJob {
    pub fn new(core: JobCore) -> Self {
        Self {
            core,
            track: StateTrack::default(),
            rest: RestAction::default(),
            farm: None,
            seed: MaterialLedger::new(&SEED),
            growth: 0.0,
            harvest: 0,
            cooldown: 0.0,
        }
    }

    pub fn state(&self) -> FarmerState {
        self.track.current()
    }

    pub fn is_resting(&self) -> bool {
        self.track.is_resting()
    }

    pub fn farm(&self) -> Option<EntityId> {
        self.farm
    }

    pub fn do_work(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if let Some(result) = rest_gate(&mut self.track, &mut self.rest, &mut self.core, body, ctx) {
            return result;
        }

        match self.track.current() {
            FarmerState::Waiting => self.reserve_plot(body, ctx),
            FarmerState::GatheringSeed => match fetch_step(&mut self.seed, &mut self.core, body, ctx) {
                FetchStatus::Ready => {
                    self.track.set(body.id, FarmerState::MovingToFarm);
                    StepResult::Continue
                }
                FetchStatus::Fetching => StepResult::Continue,
                FetchStatus::Stalled => StepResult::Blocked,
            },
            FarmerState::MovingToFarm => {
                let Some((id, position)) = self
                    .farm
                    .and_then(|id| ctx.facilities.get(id))
                    .map(|f| (f.id, f.position))
                else {
                    self.abandon(body, ctx);
                    return StepResult::Continue;
                };
                if ctx.walk(&mut self.core, body, position) {
                    if let Some(farm) = ctx.facilities.get_mut(id) {
                        farm.begin_use(body.id);
                    }
                    self.track.set(body.id, FarmerState::Tending);
                }
                StepResult::Continue
            }
            FarmerState::Tending => self.tend(body, ctx),
            FarmerState::Transporting => self.haul(body, ctx),
            FarmerState::Cooldown => {
                self.cooldown -= ctx.dt;
                if self.cooldown <= 0.0 {
                    self.track.set(body.id, FarmerState::Waiting);
                }
                StepResult::Continue
            }
            FarmerState::Resting => StepResult::Continue,
        }
    }

    fn reserve_plot(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if ctx.facilities.count_of(FacilityType::Farm) == 0 {
            ctx.request_build(body.id, FacilityType::Farm);
            return StepResult::Blocked;
        }

        let mut rejected = Vec::new();
        while let Some(id) =
            ctx.facilities
                .nearest(FacilityType::Farm, body.position, &rejected, Facility::has_capacity)
        {
            if ctx.facilities.get_mut(id).is_some_and(|f| f.reserve(body.id)) {
                trace!(worker = body.id.0, farm = id.0, "Farm plot reserved");
                self.farm = Some(id);
                self.seed = MaterialLedger::new(&SEED);
                self.track.set(body.id, FarmerState::GatheringSeed);
                return StepResult::Continue;
            }
            rejected.push(id);
        }
        StepResult::Blocked
    }

    fn tend(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(position) = self.farm.and_then(|id| ctx.facilities.get(id)).map(|f| f.position) else {
            self.abandon(body, ctx);
            return StepResult::Continue;
        };
        if !ctx.walk(&mut self.core, body, position) {
            return StepResult::Continue;
        }
        self.growth += ctx.jobs.farm_rate * self.core.output_factor(ctx.jobs);
        ctx.exert(&mut self.core);
        if self.growth < 100.0 {
            return StepResult::Continue;
        }

        self.growth = 0.0;
        self.seed.consume();
        self.harvest = ctx.jobs.farm_yield;
        self.release_plot(body.id, ctx);
        self.track.set(body.id, FarmerState::Transporting);
        StepResult::Continue
    }

    fn haul(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(storage) = ctx.facilities.nearest_storage(body.position) else {
            ctx.request_build(body.id, FacilityType::Storage);
            return StepResult::Blocked;
        };
        let Some(position) = ctx.facilities.get(storage).map(|f| f.position) else {
            return StepResult::Blocked;
        };
        if !ctx.walk(&mut self.core, body, position) {
            return StepResult::Continue;
        }
        let stored = ctx.deposit(body.position, ItemType::Grain, self.harvest);
        self.harvest -= stored;
        if stored > 0 {
            ctx.events.push(JobEvent::Delivered {
                worker: body.id,
                item: ItemType::Grain,
                count: stored,
            });
        }
        if self.harvest > 0 {
            return StepResult::Blocked;
        }

        ctx.finish_cycle(&mut self.core, body.id);
        self.cooldown = ctx.jobs.cooldown_seconds;
        self.track.set(body.id, FarmerState::Cooldown);
        StepResult::Done
    }

    fn release_plot(&mut self, worker: EntityId, ctx: &mut JobContext<'_>) {
        if let Some(id) = self.farm.take() {
            if let Some(farm) = ctx.facilities.get_mut(id) {
                farm.release(worker);
            }
        }
    }

    fn abandon(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.release_plot(body.id, ctx);
        ctx.return_materials(body.position, &mut self.seed);
        self.growth = 0.0;
        self.track.set(body.id, FarmerState::Waiting);
    }

    pub fn on_change_job(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.rest.abandon(body.id, ctx);
        if self.harvest > 0 {
            ctx.deposit(body.position, ItemType::Grain, self.harvest);
            self.harvest = 0;
        }
        self.abandon(body, ctx);
    }
}
