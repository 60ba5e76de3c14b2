//! Rest-at-facility protocol shared by every job
//!
//! A worker that runs out of stamina claims the nearest rest house with a
//! free slot, walks there and recovers at the house's per-level rate. The
//! claim is released on the tick stamina reaches max. If no house has room
//! the worker asks for one (a new house, or an upgrade of a full one) and
//! stalls where it stands.

use tracing::{debug, trace};

use crate::city::{Facility, FacilityType};
use crate::core::types::EntityId;
use crate::jobs::machine::{JobState, StateTrack};
use crate::jobs::{JobContext, JobCore, StepResult, WorkerBody};

#[derive(Debug, Clone, Default)]
pub struct RestAction {
    facility: Option<EntityId>,
    arrived: bool,
}

impl RestAction {
    pub fn facility(&self) -> Option<EntityId> {
        self.facility
    }

    pub fn step(&mut self, core: &mut JobCore, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if core.stamina.is_full() {
            self.abandon(body.id, ctx);
            return StepResult::Done;
        }

        if self.facility.is_none() && !self.claim(body, ctx) {
            return StepResult::Blocked;
        }
        let Some(id) = self.facility else {
            return StepResult::Blocked;
        };
        let Some(facility) = ctx.facilities.get(id) else {
            // House vanished under us; search again next tick
            self.facility = None;
            self.arrived = false;
            return StepResult::Blocked;
        };
        let (position, level) = (facility.position, facility.level);

        if !self.arrived {
            // Walking to rest costs nothing
            let (_, arrived) = ctx.step_to(body, position);
            if !arrived {
                return StepResult::Continue;
            }
            if let Some(f) = ctx.facilities.get_mut(id) {
                f.begin_use(body.id);
            }
            self.arrived = true;
        }

        core.stamina.recover(ctx.facility_config.recovery_for_level(level));
        if core.stamina.is_full() {
            self.abandon(body.id, ctx);
            debug!(worker = body.id.0, facility = id.0, "Rested");
            return StepResult::Done;
        }
        StepResult::Continue
    }

    /// Claim the nearest rest house with room, or ask for one
    fn claim(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> bool {
        let mut rejected = Vec::new();
        loop {
            let Some(id) = ctx.facilities.nearest(
                FacilityType::Refresh,
                body.position,
                &rejected,
                Facility::has_capacity,
            ) else {
                break;
            };
            if ctx
                .facilities
                .get_mut(id)
                .is_some_and(|f| f.reserve(body.id))
            {
                trace!(worker = body.id.0, facility = id.0, "Rest house claimed");
                self.facility = Some(id);
                self.arrived = false;
                return true;
            }
            rejected.push(id);
        }

        let max_level = ctx.facility_config.max_level;
        let upgradable = ctx
            .facilities
            .nearest(FacilityType::Refresh, body.position, &[], |f| f.level < max_level);
        match upgradable {
            Some(house) => ctx.request_upgrade(body.id, FacilityType::Refresh, house),
            None => ctx.request_build(body.id, FacilityType::Refresh),
        }
        false
    }

    /// Drop the claim if one is held
    pub fn abandon(&mut self, worker: EntityId, ctx: &mut JobContext<'_>) {
        if let Some(id) = self.facility.take() {
            if let Some(f) = ctx.facilities.get_mut(id) {
                f.release(worker);
            }
        }
        self.arrived = false;
    }
}

/// Route a tick through the rest protocol when the worker is (or must go) resting
///
/// Returns `None` when the job should run its own state this tick.
pub fn rest_gate<S: JobState>(
    track: &mut StateTrack<S>,
    rest: &mut RestAction,
    core: &mut JobCore,
    body: &mut WorkerBody,
    ctx: &mut JobContext<'_>,
) -> Option<StepResult> {
    if !track.is_resting() && core.stamina.is_exhausted() {
        track.enter_rest(body.id);
    }
    if !track.is_resting() {
        return None;
    }
    match rest.step(core, body, ctx) {
        StepResult::Done => {
            track.leave_rest(body.id);
            Some(StepResult::Continue)
        }
        other => Some(other),
    }
}
