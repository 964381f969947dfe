//! In-memory trip store.
//!
//! Keeps trips, destinations and accounts in process memory and enforces the
//! record rules the real backend enforces (date ranges, the destination
//! budget ceiling, cascading deletes, unique emails). Useful for running the
//! client offline and as the backend for service tests.

use async_trait::async_trait;
use shared::{
    Destination, DestinationRequest, LoginRequest, LoginResponse, SignupRequest, SignupResponse,
    Trip, TripPatch, TripRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::traits::{AuthGateway, TripStore};
use crate::error::{PlannerError, PlannerResult};

const MONEY_EPSILON: f64 = 0.001;

#[derive(Debug, Clone)]
struct Account {
    username: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct StoreState {
    trips: Vec<Trip>,
    accounts: Vec<Account>,
}

#[derive(Default)]
pub struct InMemoryTripStore {
    state: RwLock<StoreState>,
    writes: AtomicUsize,
    rejection: Mutex<Option<PlannerError>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing trips
    pub fn with_trips(trips: Vec<Trip>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                trips,
                accounts: Vec::new(),
            }),
            ..Default::default()
        }
    }

    /// Number of write requests that reached the store, rejected ones included
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make the next write fail with the given error instead of applying it
    pub async fn reject_next_write(&self, error: PlannerError) {
        *self.rejection.lock().await = Some(error);
    }

    /// Snapshot of every stored trip
    pub async fn trips(&self) -> Vec<Trip> {
        self.state.read().await.trips.clone()
    }

    async fn begin_write(&self) -> PlannerResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.rejection.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn bad_request(message: &str) -> PlannerError {
    PlannerError::Request {
        status: 400,
        message: Some(message.to_string()),
    }
}

fn not_found(message: &str) -> PlannerError {
    PlannerError::Request {
        status: 404,
        message: Some(message.to_string()),
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn check_trip(trip: &Trip) -> PlannerResult<()> {
    if trip.end_date < trip.start_date {
        return Err(bad_request("End date cannot be before start date"));
    }
    if trip.budget < 0.0 {
        return Err(bad_request("Budget must be at least 0"));
    }
    Ok(())
}

fn check_destination(
    trip: &Trip,
    destination_id: Option<&str>,
    request: &DestinationRequest,
) -> PlannerResult<()> {
    if request.activities.iter().all(|a| a.trim().is_empty()) {
        return Err(bad_request("At least one activity is required"));
    }
    if !trip.contains_date(request.date) {
        return Err(bad_request("Destination date must be within the trip dates"));
    }
    if request.budget <= 0.0 {
        return Err(bad_request("Budget must be positive"));
    }
    if trip.allocated_excluding(destination_id) + request.budget > trip.budget + MONEY_EPSILON {
        return Err(bad_request("Destination budget exceeds trip budget"));
    }
    Ok(())
}

fn find_trip_mut<'a>(trips: &'a mut [Trip], trip_id: &str) -> PlannerResult<&'a mut Trip> {
    trips
        .iter_mut()
        .find(|t| t.id == trip_id)
        .ok_or_else(|| not_found("Trip not found"))
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn list_trips(&self) -> PlannerResult<Vec<Trip>> {
        Ok(self.state.read().await.trips.clone())
    }

    async fn get_trip(&self, trip_id: &str) -> PlannerResult<Trip> {
        self.state
            .read()
            .await
            .trips
            .iter()
            .find(|t| t.id == trip_id)
            .cloned()
            .ok_or_else(|| not_found("Trip not found"))
    }

    async fn create_trip(&self, request: &TripRequest) -> PlannerResult<Trip> {
        self.begin_write().await?;
        let trip = Trip {
            id: new_id(),
            name: request.name.clone(),
            description: request.description.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            budget: request.budget,
            destinations: Vec::new(),
        };
        check_trip(&trip)?;

        self.state.write().await.trips.push(trip.clone());
        info!("Stored trip {} ({})", trip.id, trip.name);
        Ok(trip)
    }

    async fn update_trip(&self, trip_id: &str, patch: &TripPatch) -> PlannerResult<Trip> {
        self.begin_write().await?;
        let mut state = self.state.write().await;
        let trip = find_trip_mut(&mut state.trips, trip_id)?;

        let mut updated = trip.clone();
        if let Some(name) = &patch.name {
            updated.name = name.clone();
        }
        if let Some(description) = &patch.description {
            updated.description = description.clone();
        }
        if let Some(start_date) = patch.start_date {
            updated.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            updated.end_date = end_date;
        }
        if let Some(budget) = patch.budget {
            updated.budget = budget;
        }
        check_trip(&updated)?;

        *trip = updated.clone();
        debug!("Updated trip {}", trip_id);
        Ok(updated)
    }

    async fn delete_trip(&self, trip_id: &str) -> PlannerResult<()> {
        self.begin_write().await?;
        let mut state = self.state.write().await;
        let before = state.trips.len();
        state.trips.retain(|t| t.id != trip_id);
        if state.trips.len() == before {
            return Err(not_found("Trip not found"));
        }
        info!("Deleted trip {} and its destinations", trip_id);
        Ok(())
    }

    async fn get_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<Destination> {
        let trip = self.get_trip(trip_id).await?;
        trip.destination(destination_id)
            .cloned()
            .ok_or_else(|| not_found("Destination not found"))
    }

    async fn create_destination(
        &self,
        trip_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination> {
        self.begin_write().await?;
        let mut state = self.state.write().await;
        let trip = find_trip_mut(&mut state.trips, trip_id)?;
        check_destination(trip, None, request)?;

        let destination = Destination {
            id: new_id(),
            trip_id: Some(trip_id.to_string()),
            name: request.name.clone(),
            activities: request.activities.clone(),
            date: request.date,
            budget: request.budget,
            note: request.note.clone(),
        };
        trip.destinations.push(destination.clone());
        info!("Added destination {} to trip {}", destination.id, trip_id);
        Ok(destination)
    }

    async fn update_destination(
        &self,
        trip_id: &str,
        destination_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination> {
        self.begin_write().await?;
        let mut state = self.state.write().await;
        let trip = find_trip_mut(&mut state.trips, trip_id)?;
        if trip.destination(destination_id).is_none() {
            return Err(not_found("Destination not found"));
        }
        check_destination(trip, Some(destination_id), request)?;

        let destination = trip
            .destinations
            .iter_mut()
            .find(|d| d.id == destination_id)
            .ok_or_else(|| not_found("Destination not found"))?;
        destination.name = request.name.clone();
        destination.activities = request.activities.clone();
        destination.date = request.date;
        destination.budget = request.budget;
        destination.note = request.note.clone();
        Ok(destination.clone())
    }

    async fn delete_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<()> {
        self.begin_write().await?;
        let mut state = self.state.write().await;
        let trip = find_trip_mut(&mut state.trips, trip_id)?;
        let before = trip.destinations.len();
        trip.destinations.retain(|d| d.id != destination_id);
        if trip.destinations.len() == before {
            return Err(not_found("Destination not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for InMemoryTripStore {
    async fn signup(&self, request: &SignupRequest) -> PlannerResult<SignupResponse> {
        let mut state = self.state.write().await;
        if state.accounts.iter().any(|a| a.email == request.email) {
            return Err(bad_request("User already exists"));
        }
        state.accounts.push(Account {
            username: request.username.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
        });
        Ok(SignupResponse {
            message: Some("User registered successfully".to_string()),
        })
    }

    async fn login(&self, request: &LoginRequest) -> PlannerResult<LoginResponse> {
        let state = self.state.read().await;
        let account = state
            .accounts
            .iter()
            .find(|a| a.email == request.email && a.password == request.password)
            .ok_or_else(|| PlannerError::Request {
                status: 401,
                message: Some("Invalid credentials".to_string()),
            })?;
        debug!("Issued token for {}", account.username);
        Ok(LoginResponse {
            token: format!("token-{}", new_id()),
        })
    }
}
