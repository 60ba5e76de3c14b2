//! Pulling required materials out of storage one item per tick

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::city::{Facility, FacilityType, ItemType, Stockpile};
use crate::jobs::{JobContext, JobCore, WorkerBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullResult {
    /// Everything required is in hand
    Complete,
    /// One more item taken, more still needed
    Pulled(ItemType),
    /// Storage has none of the next item needed
    Missing(ItemType),
}

/// Required materials and how many of each the worker already carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLedger {
    required: Vec<(ItemType, u32)>,
    held: Vec<(ItemType, u32)>,
}

impl MaterialLedger {
    pub fn new(required: &[(ItemType, u32)]) -> Self {
        Self {
            required: required.to_vec(),
            held: required.iter().map(|(item, _)| (*item, 0)).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.required
            .iter()
            .zip(&self.held)
            .all(|((_, need), (_, have))| have >= need)
    }

    pub fn held_count(&self) -> u32 {
        self.held.iter().map(|(_, n)| n).sum()
    }

    /// Take at most one item from `stock`
    pub fn pull_one(&mut self, stock: &mut Stockpile) -> PullResult {
        let Some(idx) = (0..self.required.len()).find(|&i| self.held[i].1 < self.required[i].1) else {
            return PullResult::Complete;
        };
        let item = self.required[idx].0;
        if !stock.take_one(item) {
            return PullResult::Missing(item);
        }
        self.held[idx].1 += 1;
        if self.is_complete() {
            PullResult::Complete
        } else {
            PullResult::Pulled(item)
        }
    }

    /// Materials were used up
    pub fn consume(&mut self) {
        for (_, have) in &mut self.held {
            *have = 0;
        }
    }

    /// Carried items, dropping the ledger
    pub fn drain_held(&mut self) -> Vec<(ItemType, u32)> {
        let out = self.held.iter().copied().filter(|(_, n)| *n > 0).collect();
        self.consume();
        out
    }
}

/// Progress of a trip to storage for materials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// All required materials are in hand
    Ready,
    /// Walking to storage or pulling items
    Fetching,
    /// No storage, or storage is out of something
    Stalled,
}

/// Walk to the nearest storage and pull one required item per tick
pub fn fetch_step(
    ledger: &mut MaterialLedger,
    core: &mut JobCore,
    body: &mut WorkerBody,
    ctx: &mut JobContext<'_>,
) -> FetchStatus {
    if ledger.is_complete() {
        return FetchStatus::Ready;
    }
    let Some(storage) = ctx.facilities.nearest_storage(body.position) else {
        ctx.request_build(body.id, FacilityType::Storage);
        return FetchStatus::Stalled;
    };
    let Some(position) = ctx.facilities.get(storage).map(|f| f.position) else {
        return FetchStatus::Stalled;
    };
    if !ctx.walk(core, body, position) {
        return FetchStatus::Fetching;
    }
    let Some(stock) = ctx
        .facilities
        .get_mut(storage)
        .and_then(Facility::stockpile_mut)
    else {
        return FetchStatus::Stalled;
    };
    match ledger.pull_one(stock) {
        PullResult::Complete => FetchStatus::Ready,
        PullResult::Pulled(_) => FetchStatus::Fetching,
        PullResult::Missing(item) => {
            trace!(worker = body.id.0, ?item, "Waiting on materials");
            FetchStatus::Stalled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulls_one_item_per_call() {
        let mut stock = Stockpile::new(100);
        stock.add(ItemType::Wood, 5);
        stock.add(ItemType::Stone, 5);
        let mut ledger = MaterialLedger::new(&[(ItemType::Wood, 1), (ItemType::Stone, 2)]);

        assert_eq!(ledger.pull_one(&mut stock), PullResult::Pulled(ItemType::Wood));
        assert_eq!(stock.get(ItemType::Wood), 4);
        assert_eq!(ledger.pull_one(&mut stock), PullResult::Pulled(ItemType::Stone));
        assert_eq!(ledger.pull_one(&mut stock), PullResult::Complete);
        assert_eq!(stock.get(ItemType::Stone), 3);
        assert_eq!(ledger.pull_one(&mut stock), PullResult::Complete);
        assert_eq!(stock.get(ItemType::Stone), 3);
    }

    #[test]
    fn test_missing_item_stalls_without_taking() {
        let mut stock = Stockpile::new(100);
        stock.add(ItemType::Wood, 1);
        let mut ledger = MaterialLedger::new(&[(ItemType::Grain, 2)]);
        assert_eq!(ledger.pull_one(&mut stock), PullResult::Missing(ItemType::Grain));
        assert_eq!(ledger.held_count(), 0);
    }

    #[test]
    fn test_drain_held() {
        let mut stock = Stockpile::new(100);
        stock.add(ItemType::Wood, 3);
        let mut ledger = MaterialLedger::new(&[(ItemType::Wood, 3), (ItemType::Stone, 1)]);
        ledger.pull_one(&mut stock);
        ledger.pull_one(&mut stock);
        assert_eq!(stock.get(ItemType::Wood), 1);
        assert_eq!(ledger.drain_held(), vec![(ItemType::Wood, 2)]);
        assert_eq!(ledger.held_count(), 0);
        assert!(!ledger.is_complete());
    }

    #[test]
    fn test_empty_ledger_is_complete() {
        let mut stock = Stockpile::new(1);
        let mut ledger = MaterialLedger::new(&[]);
        assert!(ledger.is_complete());
        assert_eq!(ledger.pull_one(&mut stock), PullResult::Complete);
    }
}
