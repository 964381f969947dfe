//! Destination create/edit form.
//!
//! A destination is always validated against its parent trip, so the form
//! can only exist once that trip has been fetched: [`DestinationForm`] owns
//! the loaded [`Trip`] and validation takes it by reference.
//!
//! ## Business Rules
//!
//! - Activities are typed comma-separated and sent as a trimmed list
//! - The date must fall within the trip's dates, both ends inclusive
//! - The budget must be positive and, together with the other destinations,
//!   must not exceed the trip budget. When editing, the destination's own
//!   previous budget is left out of that sum

use shared::{
    Destination, DestinationDraft, DestinationFormValues, DestinationRequest, Trip,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::submission::SubmissionGuard;
use crate::error::{Field, PlannerError, PlannerResult, ValidationErrors};
use crate::services::date_utils::{parse_form_date, to_form_date};
use crate::store::TripStore;

pub const SAVE_DESTINATION_FALLBACK: &str = "Failed to save destination";

/// Split comma-separated activities, dropping blank entries
pub fn parse_activities(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate the destination form against its trip.
///
/// `destination_id` is the destination being edited, if any.
pub fn validate_destination_form(
    values: &DestinationFormValues,
    trip: &Trip,
    destination_id: Option<&str>,
) -> Result<DestinationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = values.name.trim();
    if name.is_empty() {
        errors.add(Field::Name, "Destination name is required");
    }

    let activities = parse_activities(&values.activities);
    if values.activities.trim().is_empty() {
        errors.add(Field::Activities, "At least one activity is required");
    } else if activities.is_empty() {
        errors.add(Field::Activities, "Enter comma-separated activities");
    }

    let date = if values.date.trim().is_empty() {
        errors.add(Field::Date, "Date is required");
        None
    } else {
        match parse_form_date(&values.date) {
            Some(date) if trip.contains_date(date) => Some(date),
            Some(_) => {
                errors.add(Field::Date, "Destination date must be within the trip dates");
                None
            }
            None => {
                errors.add(Field::Date, "Date must be a valid date");
                None
            }
        }
    };

    let budget = match values.budget.trim() {
        "" => {
            errors.add(Field::Budget, "Enter your budget");
            None
        }
        raw => match raw.parse::<f64>().ok().filter(|b| b.is_finite()) {
            None => {
                errors.add(Field::Budget, "Budget must be a number");
                None
            }
            Some(value) if value <= 0.0 => {
                errors.add(Field::Budget, "Budget must be positive");
                None
            }
            Some(value) if trip.allocated_excluding(destination_id) + value > trip.budget => {
                errors.add(Field::Budget, "Exceeding budget limit");
                None
            }
            Some(value) => Some(value),
        },
    };

    let note = values.note.trim();
    match (date, budget) {
        (Some(date), Some(budget)) if errors.is_empty() => Ok(DestinationRequest {
            name: name.to_string(),
            activities,
            date,
            budget,
            note: (!note.is_empty()).then(|| note.to_string()),
        }),
        _ => Err(errors),
    }
}

/// An open destination form with its parent trip loaded
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationForm {
    pub trip: Trip,
    /// Set when editing an existing destination
    pub destination_id: Option<String>,
    pub values: DestinationFormValues,
    /// Message from the last failed submit
    pub submit_error: Option<String>,
}

impl DestinationForm {
    pub fn is_edit(&self) -> bool {
        self.destination_id.is_some()
    }

    /// Run validation without submitting
    pub fn validate(&self) -> Result<DestinationRequest, ValidationErrors> {
        validate_destination_form(&self.values, &self.trip, self.destination_id.as_deref())
    }

    /// Budget still free for this destination
    pub fn available_budget(&self) -> f64 {
        self.trip.budget - self.trip.allocated_excluding(self.destination_id.as_deref())
    }
}

fn values_from_destination(destination: &Destination) -> DestinationFormValues {
    DestinationFormValues {
        name: destination.name.clone(),
        activities: destination.activities.join(", "),
        date: to_form_date(destination.date),
        budget: destination.budget.to_string(),
        note: destination.note.clone().unwrap_or_default(),
    }
}

#[derive(Clone)]
pub struct DestinationFormService {
    store: Arc<dyn TripStore>,
    guard: SubmissionGuard,
}

impl DestinationFormService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            guard: SubmissionGuard::new(),
        }
    }

    /// Open the form for a trip.
    ///
    /// The trip is fetched first. Initial values come from the draft when one
    /// is handed over, otherwise from the stored destination when editing,
    /// otherwise the form starts blank.
    pub async fn open(
        &self,
        trip_id: &str,
        destination_id: Option<&str>,
        draft: Option<DestinationDraft>,
    ) -> PlannerResult<DestinationForm> {
        let trip = self.store.get_trip(trip_id).await.map_err(|e| {
            warn!("Failed to load trip {} for destination form: {}", trip_id, e);
            e
        })?;

        let (destination_id, values) = match (draft, destination_id) {
            (Some(draft), id) => {
                debug!("Seeding destination form from draft {}", draft.id);
                let id = id.map(str::to_string).unwrap_or_else(|| draft.id.clone());
                (Some(id), DestinationFormValues::from(draft))
            }
            (None, Some(id)) => {
                let destination = self.store.get_destination(trip_id, id).await?;
                (Some(id.to_string()), values_from_destination(&destination))
            }
            (None, None) => (None, DestinationFormValues::default()),
        };

        Ok(DestinationForm {
            trip,
            destination_id,
            values,
            submit_error: None,
        })
    }

    /// Validate against the loaded trip, then create or update.
    ///
    /// Failures are also recorded on the form as `submit_error`.
    pub async fn submit(&self, form: &mut DestinationForm) -> PlannerResult<Destination> {
        form.submit_error = None;
        let request = form.validate().map_err(|errors| {
            warn!("Destination form rejected: {}", errors);
            PlannerError::from(errors)
        })?;

        let _ticket = self.guard.begin()?;
        let trip_id = form.trip.id.clone();
        let result = match form.destination_id.as_deref() {
            Some(id) => self.store.update_destination(&trip_id, id, &request).await,
            None => self.store.create_destination(&trip_id, &request).await,
        };

        match result {
            Ok(destination) => {
                info!("Saved destination {} on trip {}", destination.id, trip_id);
                Ok(destination)
            }
            Err(error) => {
                warn!("Failed to save destination on trip {}: {}", trip_id, error);
                form.submit_error = Some(error.user_message(SAVE_DESTINATION_FALLBACK));
                Err(error)
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }
}
