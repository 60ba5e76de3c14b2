//! Producer/consumer request queues
//!
//! Build, craft and generation work is handed out through these queues.
//! Workers never hold a reference into a queue: they keep the
//! [`RequestId`] returned by [`RequestQueue::take`] and resolve it on every
//! access. A record that has been completed or removed resolves to `None`.

use serde::{Deserialize, Serialize};

/// Stable handle to a queued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Unprocessed,
    InProcess,
}

/// Progress at which a request counts as finished
pub const COMPLETE_PROGRESS: f32 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord<T> {
    pub id: RequestId,
    pub state: RequestState,
    /// Percent, 0 to 100
    pub progress: f32,
    pub payload: T,
}

impl<T> RequestRecord<T> {
    pub fn is_finished(&self) -> bool {
        self.progress >= COMPLETE_PROGRESS
    }
}

/// Ordered list of requests with handle-based access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestQueue<T> {
    records: Vec<RequestRecord<T>>,
    next_id: u64,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> RequestQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord<T>> {
        self.records.iter()
    }

    /// Number of records nobody has taken yet
    pub fn unprocessed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state == RequestState::Unprocessed)
            .count()
    }

    /// Append a request
    pub fn push(&mut self, payload: T) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.records.push(RequestRecord {
            id,
            state: RequestState::Unprocessed,
            progress: 0.0,
            payload,
        });
        id
    }

    /// Claim the first unprocessed request
    ///
    /// The record moves to `InProcess`, so a second caller gets the next one
    /// (or nothing) until this one is reset or completed.
    pub fn take(&mut self) -> Option<RequestId> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.state == RequestState::Unprocessed)?;
        record.state = RequestState::InProcess;
        Some(record.id)
    }

    pub fn get(&self, id: RequestId) -> Option<&RequestRecord<T>> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut RequestRecord<T>> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Add progress, capped at 100. Returns the new progress.
    pub fn add_progress(&mut self, id: RequestId, amount: f32) -> Option<f32> {
        let record = self.get_mut(id)?;
        record.progress = (record.progress + amount).min(COMPLETE_PROGRESS);
        Some(record.progress)
    }

    /// Hand a request back: unprocessed again, progress cleared
    pub fn reset(&mut self, id: RequestId) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.state = RequestState::Unprocessed;
                record.progress = 0.0;
                true
            }
            None => false,
        }
    }

    /// Erase a finished request
    ///
    /// Returns the record when it was erased. A record below 100% progress
    /// stays in the queue untouched.
    pub fn complete(&mut self, id: RequestId) -> Option<RequestRecord<T>> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        if !self.records[idx].is_finished() {
            return None;
        }
        Some(self.records.remove(idx))
    }

    /// Erase a request regardless of progress
    pub fn remove(&mut self, id: RequestId) -> Option<RequestRecord<T>> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    /// Keep only records matching the predicate
    pub fn retain<F: FnMut(&RequestRecord<T>) -> bool>(&mut self, f: F) {
        self.records.retain(f);
    }
}
