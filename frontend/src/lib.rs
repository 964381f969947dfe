//! # Trip Planner Frontend
//!
//! Client logic for planning trips against the trip planner REST backend.
//!
//! The crate is UI-agnostic: it validates forms, filters trip lists, derives
//! budget totals and talks to the backend, leaving rendering and navigation
//! to whatever drives it.
//!
//! ## Architecture
//!
//! ```text
//! UI layer (not part of this crate)
//!     ↓
//! Domain layer (services, form and view state)
//!     ↓
//! Store layer (TripStore / AuthGateway traits)
//!     ↓
//! ApiClient (reqwest) or InMemoryTripStore
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::PlannerConfig;
use crate::domain::{
    AuthService, BudgetService, DestinationFormService, Session, TripDashboard,
    TripDetailsService, TripFormService,
};
use crate::error::PlannerResult;
use crate::services::{init_logging, ApiClient, SearchDebouncer};
use crate::store::{AuthGateway, TripStore};

/// Application state holding every service, all sharing one session
#[derive(Clone)]
pub struct TripPlanner {
    pub config: PlannerConfig,
    pub session: Session,
    pub store: Arc<dyn TripStore>,
    pub auth_service: AuthService,
    pub budget_service: BudgetService,
    pub trip_form_service: TripFormService,
    pub destination_form_service: DestinationFormService,
    pub trip_details_service: TripDetailsService,
}

impl TripPlanner {
    /// Wire every service onto the given backends
    pub fn with_backends(
        config: PlannerConfig,
        session: Session,
        store: Arc<dyn TripStore>,
        gateway: Arc<dyn AuthGateway>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(gateway, session.clone()),
            budget_service: BudgetService::new(store.clone()),
            trip_form_service: TripFormService::new(store.clone()),
            destination_form_service: DestinationFormService::new(store.clone()),
            trip_details_service: TripDetailsService::new(store.clone()),
            config,
            session,
            store,
        }
    }

    /// Fetch trips for the dashboard
    pub async fn dashboard(&self) -> PlannerResult<TripDashboard> {
        TripDashboard::load(&self.store).await
    }

    /// Debouncer for the dashboard search box, using the configured quiet period.
    ///
    /// The debounce task runs on the current Tokio runtime; called outside of
    /// one this fails instead of spawning.
    pub fn search_debouncer(
        &self,
    ) -> Result<(SearchDebouncer, tokio::sync::mpsc::UnboundedReceiver<String>)> {
        tokio::runtime::Handle::try_current()
            .context("Search debouncing needs a running Tokio runtime")?;
        Ok(SearchDebouncer::spawn(self.config.search_debounce()))
    }
}

/// Initialize logging and the HTTP-backed planner
pub fn initialize_planner(config: PlannerConfig) -> Result<TripPlanner> {
    init_logging(&config.log_filter);

    info!("Setting up API client for {}", config.base_url());
    let session = Session::new();
    let client = Arc::new(
        ApiClient::with_config(&config, session.clone()).context("Failed to create API client")?,
    );

    info!("Setting up application state");
    let store: Arc<dyn TripStore> = client.clone();
    let gateway: Arc<dyn AuthGateway> = client;
    Ok(TripPlanner::with_backends(config, session, store, gateway))
}
