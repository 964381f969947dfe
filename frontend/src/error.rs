//! Error types for the trip planner client.
//!
//! Validation errors stay local to a form and never reach the network.
//! Request errors carry the backend's own message when it sent one, and
//! transport errors cover everything where the backend gave us nothing
//! usable (network failure, 5xx, undecodable body).

use std::fmt;

/// Form field a validation message is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Description,
    StartDate,
    EndDate,
    Budget,
    Activities,
    Date,
    Note,
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::StartDate => "startDate",
            Field::EndDate => "endDate",
            Field::Budget => "budget",
            Field::Activities => "activities",
            Field::Date => "date",
            Field::Note => "others",
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Field-level validation failures for one form, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single failing field
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failure. The first message recorded for a field wins.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Request { status: u16, message: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Login required")]
    Unauthenticated,

    #[error("Another request is already in progress")]
    InFlight,
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    /// Text to show the user for this failure.
    ///
    /// Backend messages are passed through verbatim; everything else falls
    /// back to the message the call site supplies.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PlannerError::Validation(errors) => errors.to_string(),
            PlannerError::Request {
                message: Some(message),
                ..
            } => message.clone(),
            PlannerError::Unauthenticated => "Login required".to_string(),
            PlannerError::InFlight => "Please wait for the current request to finish".to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            PlannerError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PlannerError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(error: reqwest::Error) -> Self {
        PlannerError::Transport(error.to_string())
    }
}
