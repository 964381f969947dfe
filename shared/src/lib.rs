use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A trip as returned by the backend, with its destinations embedded.
///
/// The backend speaks camelCase and uses `_id` for identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// First day of the trip (inclusive)
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive)
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
    /// Budget ceiling for the whole trip. Missing or null budgets read as 0.
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub budget: f64,
    /// Destinations in the order the backend returned them
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl Trip {
    /// Find a destination of this trip by ID
    pub fn destination(&self, destination_id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == destination_id)
    }

    /// Whether a date falls inside the trip's [start, end] range
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Sum of destination budgets, leaving out the destination being edited
    pub fn allocated_excluding(&self, destination_id: Option<&str>) -> f64 {
        self.destinations
            .iter()
            .filter(|d| Some(d.id.as_str()) != destination_id)
            .map(|d| d.budget)
            .sum()
    }
}

/// One stop within a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Owning trip. Embedded destinations often omit it.
    #[serde(rename = "trip", alias = "tripId", default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub activities: Vec<String>,
    /// Visit date, must fall within the owning trip's dates
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub budget: f64,
    /// Free-text note (`others` on the wire)
    #[serde(rename = "others", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Derived budget totals for a single trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget: f64,
    /// Sum of all destination budgets
    pub expenses: f64,
    /// `budget - expenses`; negative when over budget
    pub remaining: f64,
    /// `expenses / budget * 100`, or 0 when the budget is 0
    pub utilization_pct: f64,
}

impl BudgetSummary {
    pub fn is_over_budget(&self) -> bool {
        self.remaining < 0.0
    }
}

/// Dashboard filters. `None` means the condition is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripFilters {
    /// Trips must start on or after this date
    pub start_date: Option<NaiveDate>,
    /// Trips must end on or before this date
    pub end_date: Option<NaiveDate>,
    /// Budget ceiling, trips must cost at most this much
    pub budget: Option<f64>,
}

impl TripFilters {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.budget.is_none()
    }
}

/// Body for `POST /trips`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub name: String,
    pub description: String,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
    pub budget: f64,
}

/// Body for `PUT /trips/{id}`. Only the fields that are set get sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_date_option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_date_option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl TripPatch {
    /// A patch that only changes the budget
    pub fn budget(budget: f64) -> Self {
        Self {
            budget: Some(budget),
            ..Default::default()
        }
    }
}

impl From<TripRequest> for TripPatch {
    fn from(request: TripRequest) -> Self {
        Self {
            name: Some(request.name),
            description: Some(request.description),
            start_date: Some(request.start_date),
            end_date: Some(request.end_date),
            budget: Some(request.budget),
        }
    }
}

/// Body for creating or updating a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRequest {
    pub name: String,
    pub activities: Vec<String>,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub budget: f64,
    #[serde(rename = "others", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error payload the backend attaches to 4xx responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw trip form input, exactly as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripFormValues {
    pub name: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    pub budget: String,
}

impl From<&Trip> for TripFormValues {
    fn from(trip: &Trip) -> Self {
        Self {
            name: trip.name.clone(),
            description: trip.description.clone(),
            start_date: trip.start_date.format(iso_date::FORMAT).to_string(),
            end_date: trip.end_date.format(iso_date::FORMAT).to_string(),
            budget: trip.budget.to_string(),
        }
    }
}

/// Raw destination form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationFormValues {
    pub name: String,
    /// Comma-separated activity names
    pub activities: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub budget: String,
    pub note: String,
}

impl From<DestinationDraft> for DestinationFormValues {
    fn from(draft: DestinationDraft) -> Self {
        Self {
            name: draft.name,
            activities: draft.activities,
            date: draft.date.format(iso_date::FORMAT).to_string(),
            budget: draft.budget.to_string(),
            note: draft.note,
        }
    }
}

/// Raw dashboard filter input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripFilterForm {
    pub start_date: String,
    pub end_date: String,
    pub budget: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginFormValues {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupFormValues {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Name and description handed to a new trip form, e.g. after picking a
/// suggested place. Consumed by value when the form opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPrefill {
    pub name: String,
    pub description: String,
}

/// Snapshot of a destination handed to its edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationDraft {
    pub id: String,
    pub name: String,
    /// Activities joined with ", " for editing
    pub activities: String,
    pub date: NaiveDate,
    pub budget: f64,
    pub note: String,
}

impl From<&Destination> for DestinationDraft {
    fn from(destination: &Destination) -> Self {
        Self {
            id: destination.id.clone(),
            name: destination.name.clone(),
            activities: destination.activities.join(", "),
            date: destination.date,
            budget: destination.budget,
            note: destination.note.clone().unwrap_or_default(),
        }
    }
}

fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Calendar dates on the wire. Accepts `YYYY-MM-DD` or a full ISO timestamp
/// (only the date part is kept) and always writes `YYYY-MM-DD`.
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Parse a date, ignoring any time component after `T`
    pub fn parse(value: &str) -> Option<NaiveDate> {
        let date_part = value.trim().split('T').next()?;
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

/// Optional variant of [`iso_date`]
pub mod iso_date_option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => super::iso_date::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::iso_date::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw))),
            None => Ok(None),
        }
    }
}
