//! HTTP service for scheduling polls: an organizer proposes two to five
//! candidate dates, participants mark the ones that suit them, and the
//! current favourites are recomputed from the ballots on every read.

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod models;
pub mod routes;
pub mod store;

pub use config::AppConfig;
pub use engine::PollEngine;
pub use error::{PollError, ValidationError};

/// State shared by every request handler.
pub struct AppData {
    pub engine: PollEngine,
    pub config: AppConfig,
}
