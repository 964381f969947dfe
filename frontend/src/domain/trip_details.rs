//! Trip details page: the trip with its destinations and the actions on it.
//!
//! Deleting a destination removes it from the local copy as soon as the
//! backend confirms, without re-fetching the trip. Only one destination
//! delete may be in flight at a time.

use shared::{DestinationDraft, Trip};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::budget_service::{compute_budget_summary, BudgetTracker};
use crate::domain::submission::SubmissionGuard;
use crate::error::PlannerResult;
use crate::store::TripStore;

pub const DELETE_TRIP_FALLBACK: &str = "Failed to delete trip";
pub const DELETE_DESTINATION_FALLBACK: &str = "Failed to delete destination";

#[derive(Clone)]
pub struct TripDetailsService {
    store: Arc<dyn TripStore>,
    deleting: SubmissionGuard,
}

impl TripDetailsService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            deleting: SubmissionGuard::new(),
        }
    }

    pub async fn load(&self, trip_id: &str) -> PlannerResult<Trip> {
        let trip = self.store.get_trip(trip_id).await.map_err(|e| {
            warn!("Failed to fetch trip {}: {}", trip_id, e);
            e
        })?;
        let summary = compute_budget_summary(&trip);
        info!(
            "Loaded trip {} with {} destinations ({:.1}% of budget used)",
            trip.id,
            trip.destinations.len(),
            summary.utilization_pct
        );
        Ok(trip)
    }

    /// Budget tracker for a loaded trip
    pub fn budget_tracker(&self, trip: &Trip) -> BudgetTracker {
        BudgetTracker::from_trip(trip)
    }

    /// Delete the trip; the backend removes its destinations with it
    pub async fn delete_trip(&self, trip_id: &str) -> PlannerResult<()> {
        match self.store.delete_trip(trip_id).await {
            Ok(()) => {
                info!("Deleted trip {}", trip_id);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete trip {}: {}", trip_id, e);
                Err(e)
            }
        }
    }

    /// Snapshot a destination for its edit form. `None` if it is not on the trip.
    pub fn begin_edit_destination(&self, trip: &Trip, destination_id: &str) -> Option<DestinationDraft> {
        trip.destination(destination_id).map(DestinationDraft::from)
    }

    /// Delete a destination and drop it from the local trip on success.
    ///
    /// A second call while one is in flight fails with `InFlight` and sends
    /// nothing. On failure the local trip is left untouched.
    pub async fn delete_destination(&self, trip: &mut Trip, destination_id: &str) -> PlannerResult<()> {
        let _ticket = self.deleting.begin()?;

        if let Err(e) = self.store.delete_destination(&trip.id, destination_id).await {
            warn!("Failed to delete destination {} of trip {}: {}", destination_id, trip.id, e);
            return Err(e);
        }

        trip.destinations.retain(|d| d.id != destination_id);
        info!("Deleted destination {} of trip {}", destination_id, trip.id);
        Ok(())
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_submitting()
    }
}
