//! Generation manager - timed regrowth and respawn
//!
//! Depleting a collectible or killing a deer queues a generate request with
//! a countdown. The countdown drops by the fixed tick delta once per tick;
//! when it runs out every registered generator of the matching kind is
//! notified and the request is dropped.

use std::fmt;

use glam::Vec3;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::requests::{RequestId, RequestQueue};
use crate::core::config::GenerationConfig;
use crate::core::rng::SimRng;
use crate::core::types::IdAllocator;
use crate::world::field::{FieldGrid, Territory};
use crate::world::objects::{CollectibleKind, CollectibleStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerateKind {
    Tree,
    Rock,
    Grass,
    Deer,
}

impl GenerateKind {
    /// Regrowth request that replaces a depleted collectible
    pub fn for_collectible(kind: CollectibleKind) -> Option<GenerateKind> {
        match kind {
            CollectibleKind::Tree => Some(GenerateKind::Tree),
            CollectibleKind::Rock => Some(GenerateKind::Rock),
            CollectibleKind::Grass => Some(GenerateKind::Grass),
            CollectibleKind::Carcass => None,
        }
    }

    pub fn delay(&self, config: &GenerationConfig) -> f32 {
        match self {
            GenerateKind::Tree => config.tree_regrow_seconds,
            GenerateKind::Rock => config.rock_regrow_seconds,
            GenerateKind::Grass => config.grass_regrow_seconds,
            GenerateKind::Deer => config.deer_respawn_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub kind: GenerateKind,
    /// Seconds left
    pub remaining: f32,
}

/// World state a generator may touch
pub struct GeneratorContext<'a> {
    pub field: &'a mut FieldGrid,
    pub collectibles: &'a mut CollectibleStore,
    pub ids: &'a mut IdAllocator,
    pub rng: &'a mut SimRng,
    /// Deer spawn points; the wildlife layer turns these into animals
    pub deer_spawns: &'a mut Vec<Vec3>,
}

/// Observer notified when a generate request of its kind expires
pub trait Generator: fmt::Debug + Send + Sync {
    fn kind(&self) -> GenerateKind;

    /// Returns whether something was generated
    fn generate(&mut self, ctx: &mut GeneratorContext<'_>) -> bool;
}

/// Regrows a collectible on a free cell of its terrain
#[derive(Debug, Clone)]
pub struct CollectibleRegrowth {
    kind: CollectibleKind,
    request_kind: GenerateKind,
    amount: u32,
}

impl CollectibleRegrowth {
    /// `None` for kinds that do not grow on terrain
    pub fn new(kind: CollectibleKind, amount: u32) -> Option<Self> {
        let request_kind = GenerateKind::for_collectible(kind)?;
        Some(Self {
            kind,
            request_kind,
            amount,
        })
    }
}

impl Generator for CollectibleRegrowth {
    fn kind(&self) -> GenerateKind {
        self.request_kind
    }

    fn generate(&mut self, ctx: &mut GeneratorContext<'_>) -> bool {
        let Some(terrain) = self.kind.terrain() else {
            return false;
        };
        let free = ctx.field.free_cells(|cell| cell.terrain == terrain);
        let Some(&coord) = free.choose(&mut *ctx.rng) else {
            return false;
        };
        let id = ctx.ids.allocate();
        if !ctx.field.claim(coord, id) {
            return false;
        }
        let position = ctx.field.cell_center(coord);
        ctx.collectibles
            .spawn(id, self.kind, position, Some(coord), self.amount);
        true
    }
}

/// Picks a spawn point for a new deer inside deer territory
#[derive(Debug, Clone, Default)]
pub struct HerdRespawn;

impl Generator for HerdRespawn {
    fn kind(&self) -> GenerateKind {
        GenerateKind::Deer
    }

    fn generate(&mut self, ctx: &mut GeneratorContext<'_>) -> bool {
        let cells = ctx.field.free_cells(|cell| cell.territory == Territory::Deer);
        match cells.choose(&mut *ctx.rng) {
            Some(&coord) => {
                ctx.deer_spawns.push(ctx.field.cell_center(coord));
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct GenerationManager {
    requests: RequestQueue<GenerateRequest>,
    generators: Vec<Box<dyn Generator>>,
}

impl GenerationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    pub fn pending_of(&self, kind: GenerateKind) -> usize {
        self.requests.iter().filter(|r| r.payload.kind == kind).count()
    }

    /// Queue a request. Requests are never merged.
    pub fn request(&mut self, kind: GenerateKind, delay: f32) -> RequestId {
        let id = self.requests.push(GenerateRequest {
            kind,
            remaining: delay,
        });
        debug!(request = id.0, ?kind, delay, "Generation requested");
        id
    }

    /// Count every request down by `dt` and fire the ones that ran out
    ///
    /// Returns the kinds that fired, in queue order.
    pub fn tick(&mut self, dt: f32, ctx: &mut GeneratorContext<'_>) -> Vec<GenerateKind> {
        let mut expired = Vec::new();
        for id in self.requests.iter().map(|r| r.id).collect::<Vec<_>>() {
            if let Some(record) = self.requests.get_mut(id) {
                record.payload.remaining -= dt;
                if record.payload.remaining <= 0.0 {
                    expired.push((id, record.payload.kind));
                }
            }
        }

        for (id, kind) in &expired {
            let mut generated = 0;
            for generator in self.generators.iter_mut().filter(|g| g.kind() == *kind) {
                if generator.generate(ctx) {
                    generated += 1;
                }
            }
            debug!(request = id.0, ?kind, generated, "Generation request fired");
            self.requests.remove(*id);
        }

        expired.into_iter().map(|(_, kind)| kind).collect()
    }
}

/// Default generator set for a world
pub fn default_generators(amounts: &[(CollectibleKind, u32)]) -> Vec<Box<dyn Generator>> {
    let mut generators: Vec<Box<dyn Generator>> = amounts
        .iter()
        .filter_map(|&(kind, amount)| CollectibleRegrowth::new(kind, amount))
        .map(|g| Box::new(g) as Box<dyn Generator>)
        .collect();
    generators.push(Box::new(HerdRespawn));
    generators
}
