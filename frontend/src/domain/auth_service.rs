//! Signup, login and logout, plus the actions that require being logged in.

use shared::{
    LoginFormValues, LoginRequest, SignupFormValues, SignupRequest, TripPrefill,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::session::Session;
use crate::domain::submission::SubmissionGuard;
use crate::error::{Field, PlannerError, PlannerResult, ValidationErrors};
use crate::store::AuthGateway;

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const SIGNUP_FALLBACK: &str = "Signup failed. Please try again.";
pub const SIGNUP_SUCCESS: &str = "Signup successful! Redirecting to login...";

const MIN_PASSWORD_LEN: usize = 6;

/// Loose shape check: something@domain.tld with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn check_email(email: &str, errors: &mut ValidationErrors) {
    if email.is_empty() {
        errors.add(Field::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.add(Field::Email, "Invalid email address");
    }
}

fn check_password(password: &str, errors: &mut ValidationErrors) {
    if password.is_empty() {
        errors.add(Field::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(Field::Password, "Password must be at least 6 characters");
    }
}

pub fn validate_login_form(values: &LoginFormValues) -> Result<LoginRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let email = values.email.trim();
    check_email(email, &mut errors);
    check_password(&values.password, &mut errors);

    errors.into_result(LoginRequest {
        email: email.to_string(),
        password: values.password.clone(),
    })
}

pub fn validate_signup_form(values: &SignupFormValues) -> Result<SignupRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = values.username.trim();
    if username.is_empty() {
        errors.add(Field::Username, "Username is required");
    }
    let email = values.email.trim();
    check_email(email, &mut errors);
    check_password(&values.password, &mut errors);

    if values.confirm_password.is_empty() {
        errors.add(Field::ConfirmPassword, "Confirm Password is required");
    } else if values.confirm_password != values.password {
        errors.add(Field::ConfirmPassword, "Passwords must match");
    }

    errors.into_result(SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: values.password.clone(),
    })
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    session: Session,
    guard: SubmissionGuard,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Register a new account. Returns the confirmation message to show;
    /// the user still has to log in afterwards.
    pub async fn signup(&self, values: &SignupFormValues) -> PlannerResult<String> {
        let request = validate_signup_form(values).map_err(|errors| {
            warn!("Signup form rejected: {}", errors);
            PlannerError::from(errors)
        })?;

        let _ticket = self.guard.begin()?;
        match self.gateway.signup(&request).await {
            Ok(response) => {
                info!(
                    "Registered {} ({})",
                    request.username,
                    response.message.as_deref().unwrap_or("no message")
                );
                Ok(SIGNUP_SUCCESS.to_string())
            }
            Err(e) => {
                warn!("Signup failed for {}: {}", request.email, e);
                Err(e)
            }
        }
    }

    /// Log in and store the returned token in the session
    pub async fn login(&self, values: &LoginFormValues) -> PlannerResult<()> {
        let request = validate_login_form(values).map_err(|errors| {
            warn!("Login form rejected: {}", errors);
            PlannerError::from(errors)
        })?;

        let _ticket = self.guard.begin()?;
        let response = self.gateway.login(&request).await.map_err(|e| {
            warn!("Login failed for {}: {}", request.email, e);
            e
        })?;

        self.session.login(response.token);
        info!("Logged in as {}", request.email);
        Ok(())
    }

    pub fn logout(&self) {
        self.session.logout();
        info!("Logged out");
    }

    /// Start planning a trip to a suggested place.
    ///
    /// Only allowed when logged in; the returned prefill seeds the new trip form.
    pub fn start_trip_from_place(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> PlannerResult<TripPrefill> {
        self.session.require_login().map_err(|e| {
            warn!("Trip planning requested without a login");
            e
        })?;
        Ok(TripPrefill {
            name: name.into(),
            description: description.into(),
        })
    }
}
