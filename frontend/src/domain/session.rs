//! Session context.
//!
//! Holds the bearer credential for the lifetime of the application session.
//! Login state is derived from whether a credential is present. The session
//! is passed explicitly to whatever needs it; cloning shares the same slot.

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::error::{PlannerError, PlannerResult};

#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that already holds a credential
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    pub fn login(&self, token: impl Into<String>) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
        info!("Session credential stored");
    }

    pub fn logout(&self) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            info!("Session credential cleared");
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Current credential, if any
    pub fn bearer_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Gate for pages that only make sense when logged in
    pub fn require_login(&self) -> PlannerResult<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(PlannerError::Unauthenticated)
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}
