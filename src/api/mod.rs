//! HTTP API for vizier.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /api/profile` - Profile the fields of an inline dataset
//! - `POST /api/summarize` - Summarize an inline dataset
//! - `POST /api/goals` - Generate visualization goals
//! - `POST /api/personas` - Suggest personas who would explore a dataset

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
