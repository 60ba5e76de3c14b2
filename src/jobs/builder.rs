//! Builder - turns build requests into facilities
//!
//! A builder takes the oldest open request, claims a buildable cell near
//! the village centre (or walks to the facility being upgraded), fetches
//! the build cost from storage one item per tick and works the request
//! up to 100%.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::city::{BuildOrder, ContributionResult, RequestId};
use crate::core::types::CellCoord;
use crate::jobs::machine::{JobState, StateTrack};
use crate::jobs::materials::{fetch_step, FetchStatus, MaterialLedger};
use crate::jobs::rest::{rest_gate, RestAction};
use crate::jobs::{JobContext, JobCore, JobEvent, StepResult, WorkerBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuilderState {
    Waiting,
    ClaimingSite,
    GatheringMaterials,
    MovingToSite,
    Building,
    Cooldown,
    Resting,
}

impl JobState for BuilderState {
    const START: Self = BuilderState::Waiting;
    const REST: Self = BuilderState::Resting;
}

#[derive(Debug, Clone)]
pub struct BuilderJob {
    pub core: JobCore,
    track: StateTrack<BuilderState>,
    rest: RestAction,
    request: Option<RequestId>,
    order: Option<BuildOrder>,
    /// Cell claimed for a new facility
    site: Option<CellCoord>,
    materials: MaterialLedger,
    cooldown: f32,
}

impl BuilderJob {
    pub fn new(core: JobCore) -> Self {
        Self {
            core,
            track: StateTrack::default(),
            rest: RestAction::default(),
            request: None,
            order: None,
            site: None,
            materials: MaterialLedger::default(),
            cooldown: 0.0,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.track.current()
    }

    pub fn is_resting(&self) -> bool {
        self.track.is_resting()
    }

    pub fn request(&self) -> Option<RequestId> {
        self.request
    }

    pub fn site(&self) -> Option<CellCoord> {
        self.site
    }

    pub fn do_work(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if let Some(result) = rest_gate(&mut self.track, &mut self.rest, &mut self.core, body, ctx) {
            return result;
        }

        match self.track.current() {
            BuilderState::Waiting => self.take_request(body, ctx),
            BuilderState::ClaimingSite => self.claim_site(body, ctx),
            BuilderState::GatheringMaterials => {
                match fetch_step(&mut self.materials, &mut self.core, body, ctx) {
                    FetchStatus::Ready => {
                        self.track.set(body.id, BuilderState::MovingToSite);
                        StepResult::Continue
                    }
                    FetchStatus::Fetching => StepResult::Continue,
                    FetchStatus::Stalled => StepResult::Blocked,
                }
            }
            BuilderState::MovingToSite => {
                let Some(target) = self.site_position(ctx) else {
                    self.abandon(body, ctx);
                    return StepResult::Continue;
                };
                if ctx.walk(&mut self.core, body, target) {
                    self.track.set(body.id, BuilderState::Building);
                }
                StepResult::Continue
            }
            BuilderState::Building => self.build(body, ctx),
            BuilderState::Cooldown => {
                self.cooldown -= ctx.dt;
                if self.cooldown <= 0.0 {
                    self.track.set(body.id, BuilderState::Waiting);
                }
                StepResult::Continue
            }
            BuilderState::Resting => StepResult::Continue,
        }
    }

    fn take_request(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(id) = ctx.builds.take() else {
            return StepResult::Blocked;
        };
        let Some(order) = ctx.builds.get(id).map(|r| r.payload) else {
            return StepResult::Blocked;
        };
        debug!(worker = body.id.0, request = id.0, facility = ?order.facility_type, "Builder took request");
        self.request = Some(id);
        self.order = Some(order);
        self.materials = MaterialLedger::new(order.facility_type.build_cost());
        self.track.set(body.id, BuilderState::ClaimingSite);
        StepResult::Continue
    }

    fn claim_site(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(order) = self.order.as_mut() else {
            self.track.set(body.id, BuilderState::Waiting);
            return StepResult::Continue;
        };
        if let Some(facility) = order.upgrade {
            if ctx.facilities.get(facility).is_some() {
                self.track.set(body.id, BuilderState::GatheringMaterials);
                return StepResult::Continue;
            }
            // Upgrade target is gone; put up a new one instead
            order.upgrade = None;
        }

        let centre = ctx.field.world_to_cell(ctx.village_center);
        let Some(cell) = ctx.field.find_buildable_near(centre) else {
            return StepResult::Blocked;
        };
        if !ctx.field.claim(cell, body.id) {
            return StepResult::Blocked;
        }
        self.site = Some(cell);
        self.track.set(body.id, BuilderState::GatheringMaterials);
        StepResult::Continue
    }

    fn site_position(&self, ctx: &JobContext<'_>) -> Option<Vec3> {
        match self.order?.upgrade {
            Some(facility) => ctx.facilities.get(facility).map(|f| f.position),
            None => self.site.map(|cell| ctx.field.cell_center(cell)),
        }
    }

    fn build(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(request) = self.request else {
            self.track.set(body.id, BuilderState::Waiting);
            return StepResult::Continue;
        };
        let Some(target) = self.site_position(ctx) else {
            self.abandon(body, ctx);
            return StepResult::Continue;
        };
        // Back from rest: walk to the site before building on
        if !ctx.walk(&mut self.core, body, target) {
            return StepResult::Continue;
        }
        let percent = ctx.jobs.build_rate * self.core.output_factor(ctx.jobs);
        ctx.exert(&mut self.core);

        match ctx.builds.contribute(request, percent) {
            ContributionResult::InProgress { .. } => StepResult::Continue,
            ContributionResult::NotFound => {
                self.abandon(body, ctx);
                StepResult::Continue
            }
            ContributionResult::Completed => self.finish(body, request, ctx),
        }
    }

    fn finish(&mut self, body: &WorkerBody, request: RequestId, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(order) = ctx.builds.complete(request) else {
            return StepResult::Blocked;
        };
        self.request = None;
        self.order = None;
        self.materials.consume();

        let built = match order.upgrade.and_then(|id| ctx.facilities.get_mut(id)) {
            Some(facility) => {
                facility.level = (facility.level + 1).min(ctx.facility_config.max_level);
                Some((facility.id, facility.level))
            }
            None => self.site.take().map(|cell| {
                let id = ctx.ids.allocate();
                ctx.field.release(cell, body.id);
                ctx.field.claim(cell, id);
                let position = ctx.field.cell_center(cell);
                ctx.facilities.spawn(id, order.facility_type, position, cell);
                (id, 1)
            }),
        };

        if let Some((facility, level)) = built {
            info!(
                worker = body.id.0,
                facility = facility.0,
                facility_type = ?order.facility_type,
                level,
                "Facility built"
            );
            ctx.events.push(JobEvent::FacilityBuilt {
                worker: body.id,
                facility,
                facility_type: order.facility_type,
                level,
            });
        }

        ctx.finish_cycle(&mut self.core, body.id);
        self.cooldown = ctx.jobs.cooldown_seconds;
        self.track.set(body.id, BuilderState::Cooldown);
        StepResult::Done
    }

    /// Drop the current request and everything tied to it
    fn abandon(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        if let Some(request) = self.request.take() {
            ctx.builds.reset(request);
        }
        self.order = None;
        if let Some(cell) = self.site.take() {
            ctx.field.release(cell, body.id);
        }
        ctx.return_materials(body.position, &mut self.materials);
        self.track.set(body.id, BuilderState::Waiting);
    }

    pub fn on_change_job(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.rest.abandon(body.id, ctx);
        self.abandon(body, ctx);
    }
}
