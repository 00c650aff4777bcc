//! HTTP adapters - REST API and the assembled application router.

pub mod api;
mod router;

pub use api::{api_router, ApiAppState, ApiError};
pub use router::{app_router, AppState};
