//! Optimistic toggle state
//!
//! A toggle flips its local state as soon as the user acts, marks itself
//! pending, and settles when the request completes:
//!
//! - success: the flip is confirmed
//! - 409 on add: the relation already existed, which is the state we wanted,
//!   so the flip is confirmed too
//! - any other failure: the previous state (and count) is restored
//!
//! Only one request may be in flight per toggle; a second `begin` while
//! pending is refused rather than queued.

use crate::error::{ClientError, Result};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleIntent {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    Idle,
    Pending,
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    active: bool,
    count: i64,
}

/// Local view of one relation, e.g. "I like this post" plus its like count.
#[derive(Debug, Clone)]
pub struct OptimisticToggle {
    active: bool,
    count: i64,
    phase: TogglePhase,
    in_flight: Option<(ToggleIntent, Snapshot)>,
}

impl OptimisticToggle {
    pub fn new(active: bool, count: i64) -> Self {
        Self {
            active,
            count,
            phase: TogglePhase::Idle,
            in_flight: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn phase(&self) -> TogglePhase {
        self.phase
    }

    /// Flip locally and return the request to send.
    pub fn begin(&mut self) -> Result<ToggleIntent> {
        if self.phase == TogglePhase::Pending {
            return Err(ClientError::Busy);
        }

        let snapshot = Snapshot {
            active: self.active,
            count: self.count,
        };
        let intent = if self.active {
            ToggleIntent::Remove
        } else {
            ToggleIntent::Add
        };

        self.active = !self.active;
        self.count = match intent {
            ToggleIntent::Add => self.count + 1,
            ToggleIntent::Remove => (self.count - 1).max(0),
        };
        self.phase = TogglePhase::Pending;
        self.in_flight = Some((intent, snapshot));

        Ok(intent)
    }

    /// Apply the server's answer to the pending flip.
    ///
    /// Returns the error back when the flip was rolled back so callers can
    /// surface the server message.
    pub fn settle(&mut self, outcome: Result<()>) -> Result<()> {
        let Some((intent, snapshot)) = self.in_flight.take() else {
            return outcome;
        };

        match outcome {
            Ok(()) => {
                self.phase = TogglePhase::Confirmed;
                Ok(())
            }
            Err(err) if intent == ToggleIntent::Add && err.is_conflict() => {
                self.phase = TogglePhase::Confirmed;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(?intent, error = %err, "rolling back optimistic toggle");
                self.active = snapshot.active;
                self.count = snapshot.count;
                self.phase = TogglePhase::RolledBack;
                Err(err)
            }
        }
    }

    /// `begin`, send, `settle` in one call.
    pub async fn run<F, Fut>(&mut self, send: F) -> Result<()>
    where
        F: FnOnce(ToggleIntent) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let intent = self.begin()?;
        let outcome = send(intent).await;
        self.settle(outcome)
    }
}
