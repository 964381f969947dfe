//! Drives the HTTP client against an in-process stub of the trip planner API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use frontend::config::PlannerConfig;
use frontend::domain::{
    compute_budget_summary, Session, DELETE_DESTINATION_FALLBACK, LOGIN_FALLBACK,
};
use frontend::error::PlannerError;
use frontend::services::ApiClient;
use frontend::store::{AuthGateway, TripStore};
use frontend::TripPlanner;
use serde_json::{json, Value};
use shared::{LoginFormValues, LoginRequest, Trip, TripFilterForm, TripPatch};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct StubState {
    trips: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

impl StubState {
    fn record(&self, headers: &HeaderMap) {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(header);
    }

    fn last_auth(&self) -> Option<String> {
        self.auth_headers.lock().unwrap().last().cloned().flatten()
    }
}

fn seed_trips() -> Vec<Value> {
    vec![
        json!({
            "_id": "t1",
            "name": "Goa",
            "description": "Beaches",
            "startDate": "2024-01-01T00:00:00.000Z",
            "endDate": "2024-01-10T00:00:00.000Z",
            "budget": 1000,
            "destinations": [
                {
                    "_id": "d1",
                    "trip": "t1",
                    "name": "Baga",
                    "activities": ["Swim", "Surf"],
                    "date": "2024-01-02T00:00:00.000Z",
                    "budget": 300,
                    "others": "Sunset"
                },
                {
                    "_id": "d2",
                    "trip": "t1",
                    "name": "Anjuna",
                    "activities": ["Market"],
                    "date": "2024-01-04T00:00:00.000Z",
                    "budget": 200
                }
            ]
        }),
        json!({
            "_id": "t2",
            "name": "Leh",
            "description": "Mountains",
            "startDate": "2024-06-01",
            "endDate": "2024-06-10",
            "budget": null
        }),
    ]
}

async fn signup(Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == "taken@example.com" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "User already exists" })));
    }
    (StatusCode::CREATED, Json(json!({ "message": "User registered successfully" })))
}

async fn login(State(state): State<StubState>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    state.record(&headers);
    if body["password"] == "secret1" {
        (StatusCode::OK, Json(json!({ "token": "stub-token" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" })))
    }
}

async fn list_trips(State(state): State<StubState>, headers: HeaderMap) -> impl IntoResponse {
    state.record(&headers);
    if headers.get("authorization").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No token provided" })));
    }
    let trips = state.trips.lock().unwrap().clone();
    (StatusCode::OK, Json(Value::Array(trips)))
}

async fn get_trip(State(state): State<StubState>, headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    state.record(&headers);
    let trips = state.trips.lock().unwrap();
    match trips.iter().find(|t| t["_id"] == id.as_str()) {
        Some(trip) => (StatusCode::OK, Json(trip.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Trip not found" }))),
    }
}

async fn update_trip(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    state.record(&headers);
    if id == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "database down" })));
    }
    let mut trips = state.trips.lock().unwrap();
    match trips.iter_mut().find(|t| t["_id"] == id.as_str()) {
        Some(trip) => {
            if let (Some(trip), Some(patch)) = (trip.as_object_mut(), patch.as_object()) {
                for (key, value) in patch {
                    trip.insert(key.clone(), value.clone());
                }
            }
            (StatusCode::OK, Json(trip.clone()))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Trip not found" }))),
    }
}

async fn delete_trip(State(state): State<StubState>, headers: HeaderMap, Path(id): Path<String>) -> StatusCode {
    state.record(&headers);
    state.trips.lock().unwrap().retain(|t| t["_id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn get_destination(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((trip_id, destination_id)): Path<(String, String)>,
) -> impl IntoResponse {
    state.record(&headers);
    let trips = state.trips.lock().unwrap();
    let destination = trips
        .iter()
        .find(|t| t["_id"] == trip_id.as_str())
        .and_then(|t| t["destinations"].as_array())
        .and_then(|ds| ds.iter().find(|d| d["_id"] == destination_id.as_str()))
        .cloned();
    match destination {
        Some(destination) => (StatusCode::OK, Json(destination)),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Destination not found" }))),
    }
}

async fn create_destination(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    state.record(&headers);
    body["_id"] = json!("d3");
    body["trip"] = json!(trip_id);
    (StatusCode::CREATED, Json(body))
}

async fn delete_destination(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((trip_id, destination_id)): Path<(String, String)>,
) -> impl IntoResponse {
    state.record(&headers);
    if destination_id == "locked" {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let mut trips = state.trips.lock().unwrap();
    if let Some(destinations) = trips
        .iter_mut()
        .find(|t| t["_id"] == trip_id.as_str())
        .and_then(|t| t["destinations"].as_array_mut())
    {
        destinations.retain(|d| d["_id"] != destination_id.as_str());
    }
    StatusCode::NO_CONTENT
}

async fn spawn_stub() -> (String, StubState) {
    let state = StubState {
        trips: Arc::new(Mutex::new(seed_trips())),
        ..Default::default()
    };
    let app = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/trips", get(list_trips))
        .route("/api/trips/:id", get(get_trip).put(update_trip).delete(delete_trip))
        .route("/api/trips/:id/destinations", post(create_destination))
        .route("/api/trips/:id/destinations/:dest_id", get(get_destination))
        .route("/api/destinations/:trip_id/:dest_id", delete(delete_destination).put(put_destination))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), state)
}

async fn put_destination(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((trip_id, destination_id)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    state.record(&headers);
    body["_id"] = json!(destination_id);
    body["trip"] = json!(trip_id);
    (StatusCode::OK, Json(body))
}

fn planner(base_url: &str) -> TripPlanner {
    let config = PlannerConfig {
        api_base_url: base_url.to_string(),
        ..Default::default()
    };
    let session = Session::new();
    let client = Arc::new(ApiClient::with_config(&config, session.clone()).unwrap());
    TripPlanner::with_backends(config, session, client.clone(), client)
}

#[tokio::test]
async fn test_bearer_header_follows_login_and_logout() {
    let (base_url, state) = spawn_stub().await;
    let planner = planner(&base_url);

    let error = planner.dashboard().await.unwrap_err();
    assert_eq!(error.status(), Some(401));
    assert_eq!(state.last_auth(), None);

    planner
        .auth_service
        .login(&LoginFormValues {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    let dashboard = planner.dashboard().await.unwrap();
    assert_eq!(dashboard.trips().len(), 2);
    assert_eq!(state.last_auth().as_deref(), Some("Bearer stub-token"));

    planner.auth_service.logout();
    assert!(planner.dashboard().await.is_err());
    assert_eq!(state.last_auth(), None);
}

#[tokio::test]
async fn test_login_and_signup_never_send_credentials() {
    let (base_url, state) = spawn_stub().await;
    let client = ApiClient::with_base_url(&base_url, Session::with_token("old-token")).unwrap();

    let response = client
        .login(&LoginRequest {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "stub-token");
    assert_eq!(state.last_auth(), None);
}

#[tokio::test]
async fn test_client_errors_carry_server_message() {
    let (base_url, _) = spawn_stub().await;
    let planner = planner(&base_url);

    let error = planner
        .auth_service
        .login(&LoginFormValues {
            email: "asha@example.com".to_string(),
            password: "wrong-one".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error.user_message(LOGIN_FALLBACK), "Invalid credentials");

    let error = planner
        .auth_service
        .signup(&shared::SignupFormValues {
            username: "asha".to_string(),
            email: "taken@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(400));
    assert_eq!(error.user_message("Signup failed"), "User already exists");

    planner.session.login("stub-token");
    let error = planner.trip_details_service.load("missing").await.unwrap_err();
    assert_eq!(error.user_message("Failed to load trip"), "Trip not found");
}

#[tokio::test]
async fn test_server_errors_are_transport_failures() {
    let (base_url, _) = spawn_stub().await;
    let client = ApiClient::with_base_url(&base_url, Session::with_token("stub-token")).unwrap();

    let error = client.update_trip("boom", &TripPatch::budget(10.0)).await.unwrap_err();

    assert!(matches!(error, PlannerError::Transport(_)));
    assert_eq!(error.user_message("Failed to update budget"), "Failed to update budget");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_failure() {
    let client = ApiClient::with_base_url("http://127.0.0.1:9/api", Session::new()).unwrap();

    let error = client.list_trips().await.unwrap_err();

    assert!(matches!(error, PlannerError::Transport(_)));
}

#[tokio::test]
async fn test_trip_payload_decoding() {
    let (base_url, _) = spawn_stub().await;
    let client = ApiClient::with_base_url(&base_url, Session::with_token("stub-token")).unwrap();

    let trips: Vec<Trip> = client.list_trips().await.unwrap();

    assert_eq!(trips[0].start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(trips[0].destinations[0].note.as_deref(), Some("Sunset"));
    assert_eq!(trips[1].budget, 0.0);
    assert!(trips[1].destinations.is_empty());
    assert_eq!(compute_budget_summary(&trips[0]).expenses, 500.0);
}

#[tokio::test]
async fn test_trip_details_flow() {
    let (base_url, state) = spawn_stub().await;
    let planner = planner(&base_url);
    planner.session.login("stub-token");

    let mut trip = planner.trip_details_service.load("t1").await.unwrap();
    let draft = planner
        .trip_details_service
        .begin_edit_destination(&trip, "d1")
        .unwrap();

    let mut form = planner
        .destination_form_service
        .open("t1", Some("d1"), Some(draft))
        .await
        .unwrap();
    assert_eq!(form.values.activities, "Swim, Surf");
    form.values.budget = "800".to_string();
    let saved = planner.destination_form_service.submit(&mut form).await.unwrap();
    assert_eq!(saved.budget, 800.0);

    let mut form = planner.destination_form_service.open("t1", Some("d2"), None).await.unwrap();
    assert_eq!(form.values.name, "Anjuna");
    form.values.budget = "900".to_string();
    let error = planner.destination_form_service.submit(&mut form).await.unwrap_err();
    assert!(error.validation_errors().is_some());

    planner
        .trip_details_service
        .delete_destination(&mut trip, "d2")
        .await
        .unwrap();
    assert_eq!(trip.destinations.len(), 1);

    let error = planner
        .trip_details_service
        .delete_destination(&mut trip, "locked")
        .await
        .unwrap_err();
    assert_eq!(error.user_message(DELETE_DESTINATION_FALLBACK), DELETE_DESTINATION_FALLBACK);

    planner.trip_details_service.delete_trip("t1").await.unwrap();
    assert_eq!(state.trips.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_budget_update_and_dashboard_filters() {
    let (base_url, _) = spawn_stub().await;
    let planner = planner(&base_url);
    planner.session.login("stub-token");

    let mut tracker = planner.budget_service.load_tracker("t1").await.unwrap();
    tracker.new_budget = "5000".to_string();
    let summary = planner.budget_service.update_budget(&mut tracker).await.unwrap();
    assert_eq!(summary.budget, 5000.0);
    assert_eq!(summary.utilization_pct, 10.0);

    let mut dashboard = planner.dashboard().await.unwrap();
    dashboard
        .apply_filters(&TripFilterForm {
            budget: "4000".to_string(),
            ..Default::default()
        })
        .unwrap();
    let visible = dashboard.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Leh");

    dashboard.clear_filters();
    assert_eq!(dashboard.visible().len(), 2);
}
