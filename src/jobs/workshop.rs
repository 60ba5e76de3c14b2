//! Cook and smith - work off a workshop's craft orders

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::{recipe_for, Facility, FacilityType, ItemType, RequestId};
use crate::core::types::EntityId;
use crate::jobs::machine::{JobState, StateTrack};
use crate::jobs::materials::{fetch_step, FetchStatus, MaterialLedger};
use crate::jobs::rest::{rest_gate, RestAction};
use crate::jobs::{JobContext, JobCore, JobEvent, StepResult, WorkerBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkshopState {
    Waiting,
    GatheringIngredients,
    Producing,
    Transporting,
    Cooldown,
    Resting,
}

impl JobState for WorkshopState {
    const START: Self = WorkshopState::Waiting;
    const REST: Self = WorkshopState::Resting;
}

/// The order being worked, by handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveOrder {
    workshop: EntityId,
    request: RequestId,
    product: ItemType,
}

#[derive(Debug, Clone)]
pub struct WorkshopJob {
    pub core: JobCore,
    /// Kitchen for cooks, Smithy for smiths
    facility_type: FacilityType,
    track: StateTrack<WorkshopState>,
    rest: RestAction,
    order: Option<ActiveOrder>,
    materials: MaterialLedger,
    carrying: Option<ItemType>,
    cooldown: f32,
}

impl WorkshopJob {
    fn new(core: JobCore, facility_type: FacilityType) -> Self {
        Self {
            core,
            facility_type,
            track: StateTrack::default(),
            rest: RestAction::default(),
            order: None,
            materials: MaterialLedger::default(),
            carrying: None,
            cooldown: 0.0,
        }
    }

    pub fn cook(core: JobCore) -> Self {
        Self::new(core, FacilityType::Kitchen)
    }

    pub fn smith(core: JobCore) -> Self {
        Self::new(core, FacilityType::Smithy)
    }

    pub fn facility_type(&self) -> FacilityType {
        self.facility_type
    }

    pub fn state(&self) -> WorkshopState {
        self.track.current()
    }

    pub fn is_resting(&self) -> bool {
        self.track.is_resting()
    }

    pub fn carrying(&self) -> Option<ItemType> {
        self.carrying
    }

    pub fn do_work(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if let Some(result) = rest_gate(&mut self.track, &mut self.rest, &mut self.core, body, ctx) {
            return result;
        }

        match self.track.current() {
            WorkshopState::Waiting => self.take_order(body, ctx),
            WorkshopState::GatheringIngredients => {
                match fetch_step(&mut self.materials, &mut self.core, body, ctx) {
                    FetchStatus::Ready => {
                        self.track.set(body.id, WorkshopState::Producing);
                        StepResult::Continue
                    }
                    FetchStatus::Fetching => StepResult::Continue,
                    FetchStatus::Stalled => StepResult::Blocked,
                }
            }
            WorkshopState::Producing => self.produce(body, ctx),
            WorkshopState::Transporting => self.haul(body, ctx),
            WorkshopState::Cooldown => {
                self.cooldown -= ctx.dt;
                if self.cooldown <= 0.0 {
                    self.track.set(body.id, WorkshopState::Waiting);
                }
                StepResult::Continue
            }
            WorkshopState::Resting => StepResult::Continue,
        }
    }

    /// Take the first open order from the nearest workshop that has one
    fn take_order(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        if ctx.facilities.count_of(self.facility_type) == 0 {
            ctx.request_build(body.id, self.facility_type);
            return StepResult::Blocked;
        }

        let has_open = |f: &Facility| f.workshop().is_some_and(|w| w.orders.unprocessed() > 0);
        let Some(workshop) = ctx
            .facilities
            .nearest(self.facility_type, body.position, &[], has_open)
        else {
            return StepResult::Blocked;
        };
        let taken = ctx
            .facilities
            .get_mut(workshop)
            .and_then(Facility::workshop_mut)
            .and_then(|w| {
                let request = w.orders.take()?;
                w.orders.get(request).map(|r| (request, r.payload.product))
            });
        let Some((request, product)) = taken else {
            return StepResult::Blocked;
        };

        debug!(worker = body.id.0, workshop = workshop.0, request = request.0, ?product, "Craft order taken");
        self.order = Some(ActiveOrder {
            workshop,
            request,
            product,
        });
        self.materials = MaterialLedger::new(recipe_for(product).inputs);
        self.track.set(body.id, WorkshopState::GatheringIngredients);
        StepResult::Continue
    }

    fn produce(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(order) = self.order else {
            self.track.set(body.id, WorkshopState::Waiting);
            return StepResult::Continue;
        };
        let Some(position) = ctx.facilities.get(order.workshop).map(|f| f.position) else {
            self.abandon(body, ctx);
            return StepResult::Continue;
        };
        if !ctx.walk(&mut self.core, body, position) {
            return StepResult::Continue;
        }

        let rate = ctx.jobs.craft_rate * self.core.output_factor(ctx.jobs);
        ctx.exert(&mut self.core);
        let progress = ctx
            .facilities
            .get_mut(order.workshop)
            .and_then(Facility::workshop_mut)
            .and_then(|w| w.orders.add_progress(order.request, rate));
        match progress {
            None => {
                self.abandon(body, ctx);
                StepResult::Continue
            }
            Some(p) if p >= 100.0 => {
                self.materials.consume();
                self.carrying = Some(order.product);
                ctx.events.push(JobEvent::Crafted {
                    worker: body.id,
                    workshop: order.workshop,
                    item: order.product,
                });
                self.track.set(body.id, WorkshopState::Transporting);
                StepResult::Continue
            }
            Some(_) => StepResult::Continue,
        }
    }

    fn haul(&mut self, body: &mut WorkerBody, ctx: &mut JobContext<'_>) -> StepResult {
        let Some(item) = self.carrying else {
            self.track.set(body.id, WorkshopState::Waiting);
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
            return StepResult::Blocked;
        }
        self.carrying = None;
        ctx.events.push(JobEvent::Delivered {
            worker: body.id,
            item,
            count: 1,
        });
        self.complete_order(ctx);

        ctx.finish_cycle(&mut self.core, body.id);
        self.cooldown = ctx.jobs.cooldown_seconds;
        self.track.set(body.id, WorkshopState::Cooldown);
        StepResult::Done
    }

    /// Erase the finished order from its workshop
    fn complete_order(&mut self, ctx: &mut JobContext<'_>) {
        if let Some(order) = self.order.take() {
            if let Some(w) = ctx
                .facilities
                .get_mut(order.workshop)
                .and_then(Facility::workshop_mut)
            {
                w.orders.complete(order.request);
            }
        }
    }

    /// Hand the order back and return what was fetched for it
    fn abandon(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        if let Some(order) = self.order.take() {
            if let Some(w) = ctx
                .facilities
                .get_mut(order.workshop)
                .and_then(Facility::workshop_mut)
            {
                w.orders.reset(order.request);
            }
        }
        ctx.return_materials(body.position, &mut self.materials);
        self.track.set(body.id, WorkshopState::Waiting);
    }

    pub fn on_change_job(&mut self, body: &WorkerBody, ctx: &mut JobContext<'_>) {
        self.rest.abandon(body.id, ctx);
        if let Some(item) = self.carrying.take() {
            // Product already made: store it and close the order
            ctx.deposit(body.position, item, 1);
            self.complete_order(ctx);
        }
        self.abandon(body, ctx);
    }
}
