//! Build request manager
//!
//! Anything that finds a facility missing (or full) asks for one here.
//! Requests are de-duplicated by facility type, so a dozen tired workers
//! produce one rest-house order, not twelve.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::building::FacilityType;
use crate::city::requests::{RequestId, RequestQueue, RequestRecord};
use crate::core::types::EntityId;

/// What a builder should put up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub facility_type: FacilityType,
    /// Existing facility to raise a level instead of building a new one
    pub upgrade: Option<EntityId>,
}

/// Result of a builder contribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContributionResult {
    /// Work contributed, request not finished yet
    InProgress { progress: f32 },
    /// Work contributed, request reached 100%
    Completed,
    /// Request no longer exists
    NotFound,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildManager {
    queue: RequestQueue<BuildOrder>,
}

impl BuildManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord<BuildOrder>> {
        self.queue.iter()
    }

    /// Whether a request for this type is already queued
    pub fn is_requested(&self, facility_type: FacilityType) -> bool {
        self.queue
            .iter()
            .any(|r| r.payload.facility_type == facility_type)
    }

    /// Ask for a new facility of a type
    pub fn request(&mut self, facility_type: FacilityType) -> RequestId {
        self.add(BuildOrder {
            facility_type,
            upgrade: None,
        })
    }

    /// Ask for an existing facility to be raised a level
    pub fn request_upgrade(&mut self, facility_type: FacilityType, facility: EntityId) -> RequestId {
        self.add(BuildOrder {
            facility_type,
            upgrade: Some(facility),
        })
    }

    /// Queue an order unless one for the same facility type exists
    pub fn add(&mut self, order: BuildOrder) -> RequestId {
        if let Some(existing) = self
            .queue
            .iter()
            .find(|r| r.payload.facility_type == order.facility_type)
        {
            return existing.id;
        }
        let id = self.queue.push(order);
        debug!(request = id.0, facility = ?order.facility_type, upgrade = ?order.upgrade, "Build requested");
        id
    }

    pub fn take(&mut self) -> Option<RequestId> {
        self.queue.take()
    }

    pub fn get(&self, id: RequestId) -> Option<&RequestRecord<BuildOrder>> {
        self.queue.get(id)
    }

    /// Apply building progress (percent) to a request
    pub fn contribute(&mut self, id: RequestId, percent: f32) -> ContributionResult {
        match self.queue.add_progress(id, percent) {
            None => ContributionResult::NotFound,
            Some(p) if p >= 100.0 => ContributionResult::Completed,
            Some(progress) => ContributionResult::InProgress { progress },
        }
    }

    pub fn complete(&mut self, id: RequestId) -> Option<BuildOrder> {
        let record = self.queue.complete(id)?;
        debug!(request = id.0, facility = ?record.payload.facility_type, "Build request completed");
        Some(record.payload)
    }

    pub fn reset(&mut self, id: RequestId) -> bool {
        let found = self.queue.reset(id);
        if found {
            debug!(request = id.0, "Build request reset");
        }
        found
    }

    pub fn remove(&mut self, id: RequestId) -> Option<BuildOrder> {
        self.queue.remove(id).map(|r| r.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_dedup_by_type() {
        let mut builds = BuildManager::new();
        let a = builds.request(FacilityType::Refresh);
        let b = builds.request(FacilityType::Refresh);
        let c = builds.request_upgrade(FacilityType::Refresh, EntityId(4));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(builds.len(), 1);

        builds.request(FacilityType::Kitchen);
        assert_eq!(builds.len(), 2);
        assert!(builds.is_requested(FacilityType::Kitchen));
        assert!(!builds.is_requested(FacilityType::Farm));
    }

    #[test]
    fn test_contribution_lifecycle() {
        let mut builds = BuildManager::new();
        let id = builds.request(FacilityType::Farm);
        assert_eq!(builds.take(), Some(id));
        assert_eq!(builds.take(), None);

        assert_eq!(
            builds.contribute(id, 60.0),
            ContributionResult::InProgress { progress: 60.0 }
        );
        assert!(builds.complete(id).is_none());
        assert_eq!(builds.contribute(id, 60.0), ContributionResult::Completed);

        let order = builds.complete(id).unwrap();
        assert_eq!(order.facility_type, FacilityType::Farm);
        assert_eq!(builds.contribute(id, 1.0), ContributionResult::NotFound);

        // Type can be requested again once the old order is gone
        let again = builds.request(FacilityType::Farm);
        assert_ne!(again, id);
    }

    #[test]
    fn test_reset_returns_order_to_pool() {
        let mut builds = BuildManager::new();
        let id = builds.request(FacilityType::Smithy);
        builds.take();
        builds.contribute(id, 30.0);
        assert!(builds.reset(id));
        assert_eq!(builds.get(id).unwrap().progress, 0.0);
        assert_eq!(builds.take(), Some(id));
    }
}
