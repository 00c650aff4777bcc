//! HTTP adapter for the relay's REST surface:
//! - `GET /health` - Connection, queue and session counters
//! - `POST /api/init` - Mini App identity resolution

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiAppState, ApiError};
pub use routes::api_router;
