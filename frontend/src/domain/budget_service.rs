//! Budget tracking for a single trip.
//!
//! Totals are derived on the client from the trip and its destinations:
//! expenses are the sum of destination budgets, remaining is what is left of
//! the trip budget (negative when over), and utilization is expenses as a
//! percentage of the budget.
//!
//! ## Business Rules
//!
//! - Utilization is exactly 0 when the budget is 0
//! - A new budget must be a number, at least 0, and no lower than current
//!   expenses; otherwise nothing is sent
//! - One write per update, no retry; a failed write surfaces the backend's
//!   message

use shared::{BudgetSummary, Trip, TripPatch};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::submission::SubmissionGuard;
use crate::error::{Field, PlannerError, PlannerResult, ValidationErrors};
use crate::store::TripStore;

pub const UPDATE_BUDGET_FALLBACK: &str = "Failed to update budget";

/// Derive budget totals for a trip
pub fn compute_budget_summary(trip: &Trip) -> BudgetSummary {
    let expenses: f64 = trip.destinations.iter().map(|d| d.budget).sum();
    summarize(trip.budget, expenses)
}

fn summarize(budget: f64, expenses: f64) -> BudgetSummary {
    let utilization_pct = if budget == 0.0 {
        0.0
    } else {
        expenses / budget * 100.0
    };
    BudgetSummary {
        budget,
        expenses,
        remaining: budget - expenses,
        utilization_pct,
    }
}

/// Utilization with one decimal place, e.g. "45.0%"
pub fn format_utilization(summary: &BudgetSummary) -> String {
    format!("{:.1}%", summary.utilization_pct)
}

/// Width of a utilization bar in percent, clamped to 0..=100
pub fn utilization_bar_width(summary: &BudgetSummary) -> f64 {
    summary.utilization_pct.clamp(0.0, 100.0)
}

/// Format an amount in rupees the way the en-IN locale does: the last three
/// digits form a group, the rest are grouped in pairs ("₹12,34,567.5").
/// At most three fraction digits are kept and trailing zeros are dropped.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let millis = (amount.abs() * 1000.0).round() as u64;
    let whole = (millis / 1000).to_string();
    let fraction = format!("{:03}", millis % 1000);
    let fraction = fraction.trim_end_matches('0');

    let split = whole.len().saturating_sub(3);
    let (head, tail) = whole.split_at(split);
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 2);
    for (i, digit) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if !head.is_empty() {
        grouped.push(',');
    }
    grouped.push_str(tail);

    if fraction.is_empty() {
        format!("{}₹{}", sign, grouped)
    } else {
        format!("{}₹{}.{}", sign, grouped, fraction)
    }
}

/// State of the budget tracker panel on the trip details page
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    pub trip_id: String,
    pub budget: f64,
    pub expenses: f64,
    /// Raw text of the "update budget" input
    pub new_budget: String,
    pub submit_error: Option<String>,
    updating: SubmissionGuard,
}

impl BudgetTracker {
    pub fn from_trip(trip: &Trip) -> Self {
        let summary = compute_budget_summary(trip);
        Self {
            trip_id: trip.id.clone(),
            budget: summary.budget,
            expenses: summary.expenses,
            new_budget: String::new(),
            submit_error: None,
            updating: SubmissionGuard::new(),
        }
    }

    pub fn summary(&self) -> BudgetSummary {
        summarize(self.budget, self.expenses)
    }

    /// True while an update for this tracker is in flight. Cleared when the
    /// update finishes or its future is dropped.
    pub fn is_updating(&self) -> bool {
        self.updating.is_submitting()
    }

    /// The submit button is disabled while updating or with an empty input
    pub fn can_submit(&self) -> bool {
        !self.is_updating() && !self.new_budget.trim().is_empty()
    }

    fn absorb(&mut self, trip: &Trip) {
        let summary = compute_budget_summary(trip);
        self.budget = summary.budget;
        self.expenses = summary.expenses;
    }
}

/// Validate a new budget against the current expenses
pub fn validate_new_budget(input: &str, expenses: f64) -> Result<f64, ValidationErrors> {
    let parsed = input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite());

    let Some(value) = parsed else {
        return Err(ValidationErrors::single(
            Field::Budget,
            "Please enter a valid budget amount",
        ));
    };
    if value < 0.0 {
        return Err(ValidationErrors::single(Field::Budget, "Budget must be at least 0"));
    }
    if value < expenses {
        return Err(ValidationErrors::single(
            Field::Budget,
            "New budget cannot be less than current expenses",
        ));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct BudgetService {
    store: Arc<dyn TripStore>,
    guard: SubmissionGuard,
}

impl BudgetService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            guard: SubmissionGuard::new(),
        }
    }

    /// Load a fresh tracker for a trip
    pub async fn load_tracker(&self, trip_id: &str) -> PlannerResult<BudgetTracker> {
        let trip = self.store.get_trip(trip_id).await?;
        Ok(BudgetTracker::from_trip(&trip))
    }

    /// Re-fetch the trip and recompute the tracker's totals
    pub async fn refresh(&self, tracker: &mut BudgetTracker) -> PlannerResult<BudgetSummary> {
        let trip = self.store.get_trip(&tracker.trip_id).await?;
        tracker.absorb(&trip);
        Ok(tracker.summary())
    }

    /// Submit the tracker's `new_budget` input.
    ///
    /// On success the local budget is updated and the input cleared. On
    /// failure `submit_error` holds the message to show.
    pub async fn update_budget(&self, tracker: &mut BudgetTracker) -> PlannerResult<BudgetSummary> {
        tracker.submit_error = None;

        let new_budget = match validate_new_budget(&tracker.new_budget, tracker.expenses) {
            Ok(value) => value,
            Err(errors) => {
                warn!("Budget update for trip {} rejected: {}", tracker.trip_id, errors);
                let error = PlannerError::from(errors);
                tracker.submit_error = Some(error.user_message(UPDATE_BUDGET_FALLBACK));
                return Err(error);
            }
        };

        let _ticket = self.guard.begin()?;
        let updating = tracker.updating.begin()?;
        let result = self
            .store
            .update_trip(&tracker.trip_id, &TripPatch::budget(new_budget))
            .await;
        drop(updating);

        match result {
            Ok(_) => {
                info!("Updated budget of trip {} to {:.2}", tracker.trip_id, new_budget);
                tracker.budget = new_budget;
                tracker.new_budget.clear();
                Ok(tracker.summary())
            }
            Err(error) => {
                warn!("Failed to update budget of trip {}: {}", tracker.trip_id, error);
                tracker.submit_error = Some(error.user_message(UPDATE_BUDGET_FALLBACK));
                Err(error)
            }
        }
    }

    pub fn is_updating(&self) -> bool {
        self.guard.is_submitting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTripStore;
    use chrono::NaiveDate;
    use shared::Destination;

    fn destination(id: &str, budget: f64) -> Destination {
        Destination {
            id: id.to_string(),
            trip_id: Some("t1".to_string()),
            name: format!("Stop {}", id),
            activities: vec!["Walk".to_string()],
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            budget,
            note: None,
        }
    }

    fn trip(budget: f64, destination_budgets: &[f64]) -> Trip {
        Trip {
            id: "t1".to_string(),
            name: "Goa".to_string(),
            description: "Beaches".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            budget,
            destinations: destination_budgets
                .iter()
                .enumerate()
                .map(|(i, b)| destination(&format!("d{}", i), *b))
                .collect(),
        }
    }

    fn create_test_service(trips: Vec<Trip>) -> (BudgetService, Arc<InMemoryTripStore>) {
        let store = Arc::new(InMemoryTripStore::with_trips(trips));
        (BudgetService::new(store.clone()), store)
    }

    #[test]
    fn test_summary_sums_destination_budgets() {
        let summary = compute_budget_summary(&trip(1000.0, &[200.0, 250.0]));

        assert_eq!(summary.budget, 1000.0);
        assert_eq!(summary.expenses, 450.0);
        assert_eq!(summary.remaining, 550.0);
        assert_eq!(summary.utilization_pct, 45.0);
        assert_eq!(format_utilization(&summary), "45.0%");
        assert!(!summary.is_over_budget());
    }

    #[test]
    fn test_summary_of_empty_trip() {
        let summary = compute_budget_summary(&trip(500.0, &[]));

        assert_eq!(summary.expenses, 0.0);
        assert_eq!(summary.remaining, 500.0);
        assert_eq!(summary.utilization_pct, 0.0);
    }

    #[test]
    fn test_zero_budget_has_zero_utilization() {
        let summary = compute_budget_summary(&trip(0.0, &[300.0]));

        assert_eq!(summary.utilization_pct, 0.0);
        assert_eq!(summary.remaining, -300.0);
        assert!(summary.is_over_budget());
    }

    #[test]
    fn test_utilization_bar_is_clamped() {
        let summary = compute_budget_summary(&trip(100.0, &[150.0]));

        assert_eq!(summary.utilization_pct, 150.0);
        assert_eq!(utilization_bar_width(&summary), 100.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₹0");
        assert_eq!(format_currency(950.0), "₹950");
        assert_eq!(format_currency(5000.0), "₹5,000");
        assert_eq!(format_currency(100000.0), "₹1,00,000");
        assert_eq!(format_currency(1234567.5), "₹12,34,567.5");
        assert_eq!(format_currency(0.25), "₹0.25");
        assert_eq!(format_currency(1234.5678), "₹1,234.568");
        assert_eq!(format_currency(-300.0), "-₹300");
    }

    #[test]
    fn test_validate_new_budget() {
        assert_eq!(validate_new_budget("1500", 500.0), Ok(1500.0));
        assert_eq!(validate_new_budget("500", 500.0), Ok(500.0));

        let errors = validate_new_budget("400", 500.0).unwrap_err();
        assert!(errors
            .get(Field::Budget)
            .unwrap()
            .contains("cannot be less than current expenses"));

        let errors = validate_new_budget("abc", 0.0).unwrap_err();
        assert_eq!(errors.get(Field::Budget), Some("Please enter a valid budget amount"));
        assert!(validate_new_budget("", 0.0).is_err());
        assert!(validate_new_budget("-5", 0.0).is_err());
        assert!(validate_new_budget("NaN", 0.0).is_err());
    }

    #[tokio::test]
    async fn test_update_budget_below_expenses_never_writes() {
        let (service, store) = create_test_service(vec![trip(1000.0, &[500.0])]);
        let mut tracker = service.load_tracker("t1").await.unwrap();
        tracker.new_budget = "400".to_string();

        let error = service.update_budget(&mut tracker).await.unwrap_err();

        assert!(matches!(error, PlannerError::Validation(_)));
        assert_eq!(
            tracker.submit_error.as_deref(),
            Some("New budget cannot be less than current expenses")
        );
        assert_eq!(tracker.budget, 1000.0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_budget_success_updates_local_state() {
        let (service, store) = create_test_service(vec![trip(1000.0, &[500.0])]);
        let mut tracker = service.load_tracker("t1").await.unwrap();
        tracker.new_budget = "2000".to_string();
        assert!(tracker.can_submit());

        let summary = service.update_budget(&mut tracker).await.unwrap();

        assert_eq!(summary.budget, 2000.0);
        assert_eq!(summary.remaining, 1500.0);
        assert_eq!(summary.utilization_pct, 25.0);
        assert!(tracker.new_budget.is_empty());
        assert!(!tracker.is_updating());
        assert!(!service.is_updating());
        assert_eq!(store.get_trip("t1").await.unwrap().budget, 2000.0);
    }

    #[tokio::test]
    async fn test_update_budget_surfaces_server_message() {
        let (service, store) = create_test_service(vec![trip(1000.0, &[])]);
        store
            .reject_next_write(PlannerError::Request {
                status: 400,
                message: Some("Budget locked".to_string()),
            })
            .await;
        let mut tracker = service.load_tracker("t1").await.unwrap();
        tracker.new_budget = "1200".to_string();

        assert!(service.update_budget(&mut tracker).await.is_err());

        assert_eq!(tracker.submit_error.as_deref(), Some("Budget locked"));
        assert_eq!(tracker.budget, 1000.0);
        assert_eq!(tracker.new_budget, "1200");
    }

    #[tokio::test]
    async fn test_update_budget_transport_failure_uses_fallback() {
        let (service, store) = create_test_service(vec![trip(1000.0, &[])]);
        store
            .reject_next_write(PlannerError::Transport("connection reset".to_string()))
            .await;
        let mut tracker = service.load_tracker("t1").await.unwrap();
        tracker.new_budget = "1200".to_string();

        assert!(service.update_budget(&mut tracker).await.is_err());

        assert_eq!(tracker.submit_error.as_deref(), Some(UPDATE_BUDGET_FALLBACK));
        assert_eq!(store.write_count(), 1);
    }

    /// Store whose trip updates never complete
    struct StalledStore {
        trip: Trip,
    }

    #[async_trait::async_trait]
    impl TripStore for StalledStore {
        async fn list_trips(&self) -> PlannerResult<Vec<Trip>> {
            Ok(vec![self.trip.clone()])
        }

        async fn get_trip(&self, _trip_id: &str) -> PlannerResult<Trip> {
            Ok(self.trip.clone())
        }

        async fn create_trip(&self, _request: &shared::TripRequest) -> PlannerResult<Trip> {
            Err(PlannerError::Transport("read only".to_string()))
        }

        async fn update_trip(&self, _trip_id: &str, _patch: &TripPatch) -> PlannerResult<Trip> {
            std::future::pending().await
        }

        async fn delete_trip(&self, _trip_id: &str) -> PlannerResult<()> {
            Err(PlannerError::Transport("read only".to_string()))
        }

        async fn get_destination(&self, _trip_id: &str, _destination_id: &str) -> PlannerResult<Destination> {
            Err(PlannerError::Transport("read only".to_string()))
        }

        async fn create_destination(
            &self,
            _trip_id: &str,
            _request: &shared::DestinationRequest,
        ) -> PlannerResult<Destination> {
            Err(PlannerError::Transport("read only".to_string()))
        }

        async fn update_destination(
            &self,
            _trip_id: &str,
            _destination_id: &str,
            _request: &shared::DestinationRequest,
        ) -> PlannerResult<Destination> {
            Err(PlannerError::Transport("read only".to_string()))
        }

        async fn delete_destination(&self, _trip_id: &str, _destination_id: &str) -> PlannerResult<()> {
            Err(PlannerError::Transport("read only".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_update_releases_tracker() {
        let service = BudgetService::new(Arc::new(StalledStore {
            trip: trip(1000.0, &[200.0]),
        }));
        let mut tracker = service.load_tracker("t1").await.unwrap();
        tracker.new_budget = "1500".to_string();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            service.update_budget(&mut tracker),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!service.is_updating());
        assert!(!tracker.is_updating());
        assert!(tracker.can_submit());
        assert_eq!(tracker.budget, 1000.0);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_destinations() {
        let (service, store) = create_test_service(vec![trip(1000.0, &[100.0])]);
        let mut tracker = service.load_tracker("t1").await.unwrap();
        store
            .create_destination(
                "t1",
                &shared::DestinationRequest {
                    name: "Anjuna".to_string(),
                    activities: vec!["Market".to_string()],
                    date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                    budget: 300.0,
                    note: None,
                },
            )
            .await
            .unwrap();

        let summary = service.refresh(&mut tracker).await.unwrap();

        assert_eq!(summary.expenses, 400.0);
    }
}
