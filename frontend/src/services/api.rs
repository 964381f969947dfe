use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    ApiErrorBody, Destination, DestinationRequest, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, Trip, TripPatch, TripRequest,
};
use tracing::{debug, error, warn};

use crate::config::PlannerConfig;
use crate::domain::session::Session;
use crate::error::{PlannerError, PlannerResult};
use crate::store::{AuthGateway, TripStore};

/// HTTP client for the trip planner backend.
///
/// Every request except signup and login carries the session's bearer token.
/// Nothing is retried; failures are mapped onto [`PlannerError`] and left to
/// the caller.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Session,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn with_config(config: &PlannerConfig, session: Session) -> PlannerResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PlannerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            client,
            session,
        })
    }

    /// Create a client for a custom base URL with default settings
    pub fn with_base_url(base_url: &str, session: Session) -> PlannerResult<Self> {
        let config = PlannerConfig {
            api_base_url: base_url.to_string(),
            ..Default::default()
        };
        Self::with_config(&config, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => {
                warn!("Sending request without a credential");
                request
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> PlannerResult<T> {
        let response = check_status(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PlannerError::Transport(format!("Failed to parse response: {}", e)))
    }

    async fn send_empty(&self, request: RequestBuilder) -> PlannerResult<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Pass successful responses through, turn everything else into an error.
///
/// 4xx keeps the backend's `message` when the body has one; 5xx is treated
/// like a transport failure since the backend gave us nothing to act on.
async fn check_status(response: Response) -> PlannerResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    if status.is_client_error() {
        warn!("Request rejected with {}: {:?}", status, message);
        Err(PlannerError::Request {
            status: status.as_u16(),
            message,
        })
    } else {
        error!("Server error {}: {}", status, body);
        Err(PlannerError::Transport(format!("Server error {}", status)))
    }
}

#[async_trait]
impl TripStore for ApiClient {
    async fn list_trips(&self) -> PlannerResult<Vec<Trip>> {
        debug!("GET /trips");
        self.send_json(self.authorized(self.client.get(self.url("/trips"))))
            .await
    }

    async fn get_trip(&self, trip_id: &str) -> PlannerResult<Trip> {
        debug!("GET /trips/{}", trip_id);
        let url = self.url(&format!("/trips/{}", trip_id));
        self.send_json(self.authorized(self.client.get(url))).await
    }

    async fn create_trip(&self, request: &TripRequest) -> PlannerResult<Trip> {
        debug!("POST /trips");
        let builder = self.client.post(self.url("/trips")).json(request);
        self.send_json(self.authorized(builder)).await
    }

    async fn update_trip(&self, trip_id: &str, patch: &TripPatch) -> PlannerResult<Trip> {
        debug!("PUT /trips/{}", trip_id);
        let url = self.url(&format!("/trips/{}", trip_id));
        self.send_json(self.authorized(self.client.put(url).json(patch)))
            .await
    }

    async fn delete_trip(&self, trip_id: &str) -> PlannerResult<()> {
        debug!("DELETE /trips/{}", trip_id);
        let url = self.url(&format!("/trips/{}", trip_id));
        self.send_empty(self.authorized(self.client.delete(url))).await
    }

    async fn get_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<Destination> {
        debug!("GET /trips/{}/destinations/{}", trip_id, destination_id);
        let url = self.url(&format!("/trips/{}/destinations/{}", trip_id, destination_id));
        self.send_json(self.authorized(self.client.get(url))).await
    }

    async fn create_destination(
        &self,
        trip_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination> {
        debug!("POST /trips/{}/destinations", trip_id);
        let url = self.url(&format!("/trips/{}/destinations", trip_id));
        self.send_json(self.authorized(self.client.post(url).json(request)))
            .await
    }

    async fn update_destination(
        &self,
        trip_id: &str,
        destination_id: &str,
        request: &DestinationRequest,
    ) -> PlannerResult<Destination> {
        debug!("PUT /destinations/{}/{}", trip_id, destination_id);
        let url = self.url(&format!("/destinations/{}/{}", trip_id, destination_id));
        self.send_json(self.authorized(self.client.put(url).json(request)))
            .await
    }

    async fn delete_destination(&self, trip_id: &str, destination_id: &str) -> PlannerResult<()> {
        debug!("DELETE /destinations/{}/{}", trip_id, destination_id);
        let url = self.url(&format!("/destinations/{}/{}", trip_id, destination_id));
        self.send_empty(self.authorized(self.client.delete(url))).await
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn signup(&self, request: &SignupRequest) -> PlannerResult<SignupResponse> {
        debug!("POST /auth/signup");
        let response = check_status(
            self.client
                .post(self.url("/auth/signup"))
                .json(request)
                .send()
                .await?,
        )
        .await?;

        // Some backends answer with a bare confirmation string
        let body = response.text().await?;
        Ok(serde_json::from_str::<SignupResponse>(&body).unwrap_or(SignupResponse {
            message: Some(body).filter(|b| !b.trim().is_empty()),
        }))
    }

    async fn login(&self, request: &LoginRequest) -> PlannerResult<LoginResponse> {
        debug!("POST /auth/login");
        self.send_json(self.client.post(self.url("/auth/login")).json(request))
            .await
    }
}
