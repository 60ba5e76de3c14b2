//! State bookkeeping shared by the job state machines

use std::fmt::Debug;

use tracing::trace;

use crate::core::types::EntityId;

/// A job's state enum
pub trait JobState: Copy + PartialEq + Debug {
    /// Where the job begins, and where rest falls back to
    const START: Self;
    const REST: Self;
}

/// Current and previous state of one job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateTrack<S: JobState> {
    current: S,
    previous: S,
}

impl<S: JobState> Default for StateTrack<S> {
    fn default() -> Self {
        Self {
            current: S::START,
            previous: S::START,
        }
    }
}

impl<S: JobState> StateTrack<S> {
    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> S {
        self.previous
    }

    pub fn is_resting(&self) -> bool {
        self.current == S::REST
    }

    pub fn set(&mut self, worker: EntityId, next: S) {
        if next != self.current {
            trace!(worker = worker.0, from = ?self.current, to = ?next, "Job state change");
            self.previous = self.current;
            self.current = next;
        }
    }

    /// Go rest, remembering where to come back to
    pub fn enter_rest(&mut self, worker: EntityId) {
        if self.current != S::REST {
            self.set(worker, S::REST);
        }
    }

    /// Return to the state rest interrupted
    ///
    /// Falls back to the start state when the remembered state is rest
    /// itself.
    pub fn leave_rest(&mut self, worker: EntityId) {
        let back = if self.previous == S::REST || self.previous == self.current {
            S::START
        } else {
            self.previous
        };
        self.set(worker, back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Demo {
        Idle,
        Work,
        Rest,
    }

    impl JobState for Demo {
        const START: Self = Demo::Idle;
        const REST: Self = Demo::Rest;
    }

    const W: EntityId = EntityId(1);

    #[test]
    fn test_rest_returns_to_interrupted_state() {
        let mut track = StateTrack::<Demo>::default();
        track.set(W, Demo::Work);
        track.enter_rest(W);
        assert!(track.is_resting());
        assert_eq!(track.previous(), Demo::Work);
        track.leave_rest(W);
        assert_eq!(track.current(), Demo::Work);
    }

    #[test]
    fn test_enter_rest_twice_keeps_previous() {
        let mut track = StateTrack::<Demo>::default();
        track.set(W, Demo::Work);
        track.enter_rest(W);
        track.enter_rest(W);
        assert_eq!(track.previous(), Demo::Work);
    }

    #[test]
    fn test_rest_without_prior_state_goes_to_start() {
        let mut track = StateTrack::<Demo>::default();
        track.set(W, Demo::Rest);
        track.set(W, Demo::Work);
        track.set(W, Demo::Rest);
        // previous is Work here; force the degenerate case
        let mut degenerate = StateTrack::<Demo> {
            current: Demo::Rest,
            previous: Demo::Rest,
        };
        degenerate.leave_rest(W);
        assert_eq!(degenerate.current(), Demo::Idle);
        track.leave_rest(W);
        assert_eq!(track.current(), Demo::Work);
    }
}
