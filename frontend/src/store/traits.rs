//! # Store Traits
//!
//! The remote trip store is reached only through these traits, so services
//! work the same against the HTTP client and the in-memory store.

use async_trait::async_trait;
use shared::{
    Destination, DestinationRequest, LoginRequest, LoginResponse, SignupRequest, SignupResponse,
    Trip, TripPatch, TripRequest,
};

use crate::error::PlannerResult;

/// Trip and destination records owned by the backend
#[async_trait]
pub trait TripStore: Send + Sync {
    /// List every trip visible to the current user
    async fn list_trips(&self) -> PlannerResult<Vec<Trip>>;

    /// Fetch one trip with its destinations embedded
    async fn get_trip(&self, trip_id: &str) -> PlannerResult<Trip>;

    async fn create_trip(&self, request: &TripRequest) -> PlannerResult<Trip>;

    /// Full or partial update; only the fields set in the patch change
    async fn update_trip(&self, trip_id: &str, patch: &TripPatch) -> PlannerResult<Trip>;

    /// Delete a trip together with its destinations
    async fn delete_trip(&self, trip_id: &str) -> PlannerResult<()>;

    async fn get_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<Destination>;

    async fn create_destination(
        &self,
        trip_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination>;

    async fn update_destination(
        &self,
        trip_id: &str,
        destination_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination>;

    async fn delete_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<()>;
}

/// Account endpoints, the only ones that work without a credential
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> PlannerResult<SignupResponse>;

    async fn login(&self, request: &LoginRequest) -> PlannerResult<LoginResponse>;
}
