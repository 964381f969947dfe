//! Duplicate-submission guard.
//!
//! Forms disable their submit button while a request is in flight. Here that
//! flag is an `AtomicBool` behind a ticket: taking a ticket sets it, dropping
//! the ticket clears it. A cancelled (dropped) future therefore never leaves
//! the form stuck in the submitting state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PlannerError, PlannerResult};

#[derive(Clone, Default, Debug)]
pub struct SubmissionGuard {
    in_flight: Arc<AtomicBool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the ticket, or fail with `InFlight` if another submission holds it
    pub fn begin(&self) -> PlannerResult<SubmissionTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PlannerError::InFlight)?;
        Ok(SubmissionTicket {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SubmissionTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
