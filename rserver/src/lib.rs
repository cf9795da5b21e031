//! HTTP host for the streaming conversation relay.
//!
//! Exposes one NDJSON streaming endpoint per bot, a reset endpoint for page
//! (re)entry, and serializes overlapping turns on the same conversation.

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use gate::{TurnGate, TurnPermit};
pub use routes::create_router;
pub use state::AppState;
