//! Villagers: a body in the world plus one job

use glam::Vec3;

use crate::core::config::JobConfig;
use crate::core::types::EntityId;
use crate::jobs::{Job, JobContext, JobKind, StepResult, WorkerBody};

#[derive(Debug, Clone)]
pub struct Villager {
    pub id: EntityId,
    pub name: String,
    pub body: WorkerBody,
    pub job: Job,
    pub last_step: StepResult,
}

impl Villager {
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3, kind: JobKind, config: &JobConfig) -> Self {
        Self {
            id,
            name: name.into(),
            body: WorkerBody { id, position },
            job: Job::new(kind, config),
            last_step: StepResult::Continue,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn work(&mut self, ctx: &mut JobContext<'_>) -> StepResult {
        self.last_step = self.job.do_work(&mut self.body, ctx);
        self.last_step
    }

    pub fn change_job(&mut self, kind: JobKind, ctx: &mut JobContext<'_>) {
        if self.job.kind() != kind {
            self.job.change_to(kind, &self.body, ctx);
        }
    }
}

/// Village-style name for the n-th villager
pub fn villager_name(index: usize) -> String {
    const NAMES: [&str; 12] = [
        "Alda", "Bram", "Cora", "Dunstan", "Edda", "Finn", "Gisla", "Hale", "Ivo", "Jory", "Kestrel", "Lorn",
    ];
    let base = NAMES[index % NAMES.len()];
    match index / NAMES.len() {
        0 => base.to_string(),
        n => format!("{base} {}", n + 1),
    }
}
