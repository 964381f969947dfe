//! Trip search and filtering for the dashboard.
//!
//! ## Key Responsibilities
//!
//! - **Search**: case-insensitive substring match on trip name or description
//! - **Filters**: date window and budget ceiling, composed with AND
//! - **Dashboard state**: the fetched list plus the current query and filters
//!
//! Filtering never reorders trips and never touches the fetched list, so
//! clearing everything restores exactly what the backend returned.

use shared::{Trip, TripFilterForm, TripFilters};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Field, PlannerResult, ValidationErrors};
use crate::services::date_utils::parse_form_date;
use crate::store::TripStore;

fn matches_query(trip: &Trip, needle: &str) -> bool {
    trip.name.to_lowercase().contains(needle) || trip.description.to_lowercase().contains(needle)
}

fn matches_filters(trip: &Trip, filters: &TripFilters) -> bool {
    let starts_in_window = filters.start_date.map_or(true, |start| trip.start_date >= start);
    let ends_in_window = filters.end_date.map_or(true, |end| trip.end_date <= end);
    // Ceiling only, there is no minimum budget filter
    let within_budget = filters.budget.map_or(true, |ceiling| trip.budget <= ceiling);

    starts_in_window && ends_in_window && within_budget
}

/// Apply the text query and the filters to a trip list.
///
/// A blank query matches everything. Otherwise the query is matched as
/// typed, surrounding whitespace included. The result keeps the input order.
pub fn filter_trips(trips: &[Trip], query: &str, filters: &TripFilters) -> Vec<Trip> {
    let match_all = query.trim().is_empty();
    let needle = query.to_lowercase();

    trips
        .iter()
        .filter(|trip| match_all || matches_query(trip, &needle))
        .filter(|trip| matches_filters(trip, filters))
        .cloned()
        .collect()
}

/// Parse the raw filter inputs. Blank inputs leave that condition open.
pub fn parse_filters(form: &TripFilterForm) -> Result<TripFilters, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let start_date = parse_optional_date(&form.start_date, Field::StartDate, "Start Date", &mut errors);
    let end_date = parse_optional_date(&form.end_date, Field::EndDate, "End Date", &mut errors);

    let budget = match form.budget.trim() {
        "" => None,
        raw => match raw.parse::<f64>().ok().filter(|b| b.is_finite()) {
            Some(value) if value < 0.0 => {
                errors.add(Field::Budget, "Budget must be at least 0");
                None
            }
            Some(value) => Some(value),
            None => {
                errors.add(Field::Budget, "Budget must be a number");
                None
            }
        },
    };

    errors.into_result(TripFilters {
        start_date,
        end_date,
        budget,
    })
}

fn parse_optional_date(
    raw: &str,
    field: Field,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<chrono::NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_form_date(raw);
    if parsed.is_none() {
        errors.add(field, format!("{} must be a valid date", label));
    }
    parsed
}

/// Dashboard view state: every trip the backend returned plus what the user
/// is currently searching and filtering by
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDashboard {
    trips: Vec<Trip>,
    query: String,
    filters: TripFilters,
}

impl TripDashboard {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self {
            trips,
            ..Default::default()
        }
    }

    /// Fetch the trip list and start with no query or filters
    pub async fn load(store: &Arc<dyn TripStore>) -> PlannerResult<Self> {
        let trips = store.list_trips().await?;
        info!("Loaded {} trips for the dashboard", trips.len());
        Ok(Self::new(trips))
    }

    /// Re-fetch the trip list, keeping the current query and filters
    pub async fn reload(&mut self, store: &Arc<dyn TripStore>) -> PlannerResult<()> {
        self.trips = store.list_trips().await?;
        info!("Reloaded {} trips for the dashboard", self.trips.len());
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &TripFilters {
        &self.filters
    }

    /// All fetched trips, unfiltered
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Parse and apply the filter form. Current filters are kept on error.
    pub fn apply_filters(&mut self, form: &TripFilterForm) -> Result<(), ValidationErrors> {
        match parse_filters(form) {
            Ok(filters) => {
                self.filters = filters;
                Ok(())
            }
            Err(errors) => {
                warn!("Ignoring invalid dashboard filters: {}", errors);
                Err(errors)
            }
        }
    }

    /// Drop the query and every filter
    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.filters = TripFilters::default();
    }

    /// Trips matching the current query and filters
    pub fn visible(&self) -> Vec<Trip> {
        filter_trips(&self.trips, &self.query, &self.filters)
    }

    /// Drop a trip after it was deleted elsewhere
    pub fn remove_trip(&mut self, trip_id: &str) {
        self.trips.retain(|t| t.id != trip_id);
    }
}
