//! # Services Module
//!
//! Infrastructure the domain services lean on:
//!
//! - **api**: reqwest client implementing the store traits over HTTP
//! - **debounce**: quiet-period debouncing for search input
//! - **date_utils**: form and display date helpers
//! - **logging**: `tracing` subscriber setup

pub mod api;
pub mod date_utils;
pub mod debounce;
pub mod logging;

pub use api::ApiClient;
pub use debounce::SearchDebouncer;
pub use logging::init_logging;
