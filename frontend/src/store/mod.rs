//! # Store Module
//!
//! The seam between the client and the remote trip store.
//!
//! - **traits**: `TripStore` and `AuthGateway`, the only way services reach
//!   persisted records
//! - **memory**: an in-process store that re-checks the same record rules the
//!   backend does; used offline and in tests
//!
//! The HTTP implementation lives in `services::api`.

pub mod memory;
pub mod traits;

pub use memory::InMemoryTripStore;
pub use traits::{AuthGateway, TripStore};
