//! Trip create/edit form.
//!
//! Validation runs locally and must pass before anything is sent. A new form
//! can be seeded from a [`TripPrefill`]; an edit form is seeded from the
//! fetched trip with its dates formatted for date inputs.

use shared::{Trip, TripFormValues, TripPatch, TripPrefill, TripRequest};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::submission::SubmissionGuard;
use crate::error::{Field, PlannerError, PlannerResult, ValidationErrors};
use crate::services::date_utils::parse_form_date;
use crate::store::TripStore;

pub const SAVE_TRIP_FALLBACK: &str = "Failed to save trip";

fn required_date(
    raw: &str,
    field: Field,
    required: &str,
    invalid: &str,
    errors: &mut ValidationErrors,
) -> Option<chrono::NaiveDate> {
    if raw.trim().is_empty() {
        errors.add(field, required);
        return None;
    }
    let parsed = parse_form_date(raw);
    if parsed.is_none() {
        errors.add(field, invalid);
    }
    parsed
}

/// Validate the trip form and build the request body
pub fn validate_trip_form(values: &TripFormValues) -> Result<TripRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = values.name.trim();
    if name.is_empty() {
        errors.add(Field::Name, "Trip Name is required");
    }
    let description = values.description.trim();
    if description.is_empty() {
        errors.add(Field::Description, "Description is required");
    }

    let start_date = required_date(
        &values.start_date,
        Field::StartDate,
        "Start Date is required",
        "Start Date must be a valid date",
        &mut errors,
    );
    let end_date = required_date(
        &values.end_date,
        Field::EndDate,
        "End Date is required",
        "End Date must be a valid date",
        &mut errors,
    );
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            errors.add(Field::EndDate, "End Date cannot be before Start Date");
        }
    }

    let budget = match values.budget.trim() {
        "" => {
            errors.add(Field::Budget, "Budget is required");
            None
        }
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

    match (start_date, end_date, budget) {
        (Some(start_date), Some(end_date), Some(budget)) if errors.is_empty() => Ok(TripRequest {
            name: name.to_string(),
            description: description.to_string(),
            start_date,
            end_date,
            budget,
        }),
        _ => Err(errors),
    }
}

/// Values to show when the trip form opens
#[derive(Debug, Clone, PartialEq)]
pub struct TripForm {
    /// Set when editing an existing trip
    pub trip_id: Option<String>,
    pub values: TripFormValues,
}

impl TripForm {
    pub fn is_edit(&self) -> bool {
        self.trip_id.is_some()
    }
}

#[derive(Clone)]
pub struct TripFormService {
    store: Arc<dyn TripStore>,
    guard: SubmissionGuard,
}

impl TripFormService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            guard: SubmissionGuard::new(),
        }
    }

    /// A blank create form, or one seeded with a prefill
    pub fn open_new(&self, prefill: Option<TripPrefill>) -> TripForm {
        let mut values = TripFormValues {
            budget: "0".to_string(),
            ..Default::default()
        };
        if let Some(prefill) = prefill {
            info!("Opening trip form prefilled with {}", prefill.name);
            values.name = prefill.name;
            values.description = prefill.description;
        }
        TripForm {
            trip_id: None,
            values,
        }
    }

    /// An edit form seeded from the stored trip
    pub async fn open_edit(&self, trip_id: &str) -> PlannerResult<TripForm> {
        let trip = self.store.get_trip(trip_id).await.map_err(|e| {
            warn!("Failed to fetch trip {} for editing: {}", trip_id, e);
            e
        })?;
        Ok(TripForm {
            trip_id: Some(trip.id.clone()),
            values: TripFormValues::from(&trip),
        })
    }

    /// Validate, then create (`trip_id == None`) or update the trip
    pub async fn submit(&self, trip_id: Option<&str>, values: &TripFormValues) -> PlannerResult<Trip> {
        let request = validate_trip_form(values).map_err(|errors| {
            warn!("Trip form rejected: {}", errors);
            PlannerError::from(errors)
        })?;

        let _ticket = self.guard.begin()?;
        let result = match trip_id {
            Some(id) => self.store.update_trip(id, &TripPatch::from(request)).await,
            None => self.store.create_trip(&request).await,
        };

        match &result {
            Ok(trip) => info!("Saved trip {} ({})", trip.id, trip.name),
            Err(e) => warn!("Failed to save trip: {}", e),
        }
        result
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }
}
