//! Gatherer - collects wood, stone, grass and meat from the field

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::{FacilityType, ItemType};
use crate::core::types::EntityId;
use crate::jobs::machine::{JobState, StateTrack};
use crate::jobs::rest::{rest_gate, RestAction};
use crate::jobs::{JobContext, JobCore, JobEvent, StepResult, WorkerBody};
use crate::world::{CollectibleKind, GenerateKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GathererState {
    Searching,
    MovingToTarget,
    Gathering,
    Transporting,
    Resting,
}

impl JobState for GathererState {
    const START: Self = GathererState::Searching;
    const REST: Self = GathererState::Resting;
}

const KINDS: [CollectibleKind; 4] = [
    CollectibleKind::Carcass,
    CollectibleKind::Tree,
    CollectibleKind::Rock,
    CollectibleKind::Grass,
];

#[derive(Debug, Clone)]
pub struct GathererJob {
    pub core: JobCore,
    track: StateTrack<GathererState>,
    rest: RestAction,
    target: Option<EntityId>,
    carrying: Option<ItemType>,
    /// Percent toward the next item
    progress: f32,
}

impl GathererJob {
    pub fn new(core: JobCore) -> Self {
        Self {
            core,
            track: StateTrack::default(),
            rest: RestAction::default(),
            target: None,
            carrying: None,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> GathererState {
        self.track.current()
    }

    pub fn is_resting(&self) -> bool {
        self.track.is_resting()
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn carrying(&self) -> Option<ItemType> {
        self.carrying
    }

    pub fn do_work(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if let Some(result) = rest_gate(&mut self.track, &mut self.rest, &mut self.core, body, ctx) {
            return result;
        }

        match self.track.current() {
            GathererState::Searching => self.search(body, ctx),
            GathererState::MovingToTarget => {
                let target = self
                    .target
                    .and_then(|id| ctx.collectibles.get(id))
                    .map(|c| c.position);
                let Some(position) = target else {
                    self.target = None;
                    self.track.set(body.id, GathererState::Searching);
                    return StepResult::Continue;
                };
                if ctx.walk(&mut self.core, body, position) {
                    self.track.set(body.id, GathererState::Gathering);
                }
                StepResult::Continue
            }
            GathererState::Gathering => self.gather(body, ctx),
            GathererState::Transporting => self.haul(body, ctx),
            GathererState::Resting => StepResult::Continue,
        }
    }

    /// Claim the nearest free collectible, scarcest item first
    fn search(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let mut kinds = KINDS;
        kinds.sort_by_key(|kind| ctx.facilities.stock_of(ItemType::from_collectible(*kind)));

        for kind in kinds {
            if let Some(id) = ctx.collectibles.claim_nearest(kind, body.position, body.id) {
                self.target = Some(id);
                self.track.set(body.id, GathererState::MovingToTarget);
                return StepResult::Continue;
            }
        }
        StepResult::Blocked
    }

    fn gather(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some((id, kind, position)) = self
            .target
            .and_then(|id| ctx.collectibles.get(id))
            .map(|c| (c.id, c.kind, c.position))
        else {
            self.target = None;
            self.progress = 0.0;
            self.track.set(body.id, GathererState::Searching);
            return StepResult::Continue;
        };
        if !ctx.walk(&mut self.core, body, position) {
            return StepResult::Continue;
        }

        self.progress += ctx.jobs.gather_rate * self.core.output_factor(ctx.jobs);
        ctx.exert(&mut self.core);
        if self.progress < 100.0 {
            return StepResult::Continue;
        }
        self.progress = 0.0;
        self.target = None;

        if ctx.collectibles.take(id, 1) == 0 {
            self.track.set(body.id, GathererState::Searching);
            return StepResult::Continue;
        }
        self.carrying = Some(ItemType::from_collectible(kind));

        let depleted = ctx.collectibles.get(id).is_some_and(|c| c.is_depleted());
        if depleted {
            if let Some(item) = ctx.collectibles.remove(id) {
                if let Some(cell) = item.cell {
                    ctx.field.release(cell, id);
                }
            }
            if let Some(regrow) = GenerateKind::for_collectible(kind) {
                ctx.generation
                    .request(regrow, regrow.delay(ctx.generation_config));
            }
            debug!(worker = body.id.0, collectible = id.0, ?kind, "Collectible depleted");
        } else {
            ctx.collectibles.release(id, body.id);
        }

        self.track.set(body.id, GathererState::Transporting);
        StepResult::Continue
    }

    fn haul(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(item) = self.carrying else {
            self.track.set(body.id, GathererState::Searching);
            return StepResult::Continue;
        };
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
        if ctx.deposit(body.position, item, 1) == 0 {
            // Storage full; wait at the door
            return StepResult::Blocked;
        }

        self.carrying = None;
        ctx.events.push(JobEvent::Delivered {
            worker: body.id,
            item,
            count: 1,
        });
        ctx.finish_cycle(&mut self.core, body.id);
        self.track.set(body.id, GathererState::Searching);
        StepResult::Done
    }

    pub fn on_change_job(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.rest.abandon(body.id, ctx);
        if let Some(id) = self.target.take() {
            ctx.collectibles.release(id, body.id);
        }
        if let Some(item) = self.carrying.take() {
            ctx.deposit(body.position, item, 1);
        }
        self.progress = 0.0;
    }
}
