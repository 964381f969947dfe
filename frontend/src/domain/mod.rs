//! # Domain Module
//!
//! Business logic for the trip planner client.
//!
//! Every page of the planner maps onto a service here plus a plain state
//! struct a UI layer can render. Services hold an `Arc`'d backend and are
//! cheap to clone; none of them know about rendering or routing.
//!
//! ## Module Organization
//!
//! - **budget_service**: budget totals, utilization and the budget tracker
//! - **trip_filter**: search and filters for the dashboard
//! - **trip_form**: trip create/edit form validation and submission
//! - **destination_form**: destination create/edit form, validated against its trip
//! - **trip_details**: trip details page actions (deletes, edit hand-off)
//! - **auth_service**: signup, login, logout and login-gated actions
//! - **session**: the credential slot shared by everything that talks to the backend
//! - **submission**: duplicate-submission guard
//!
//! ## Business Rules
//!
//! - Forms are validated locally before anything is sent
//! - Destination budgets on a trip never add up to more than the trip budget
//! - Destination dates fall within their trip's dates
//! - Budget totals are always derived, never stored

pub mod auth_service;
pub mod budget_service;
pub mod destination_form;
pub mod session;
pub mod submission;
pub mod trip_details;
pub mod trip_filter;
pub mod trip_form;

pub use auth_service::*;
pub use budget_service::*;
pub use destination_form::*;
pub use session::Session;
pub use submission::{SubmissionGuard, SubmissionTicket};
pub use trip_details::*;
pub use trip_filter::*;
pub use trip_form::*;
