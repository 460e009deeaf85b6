//! # Quill API Server
//!
//! actix-web transport for the Quill services: configuration, telemetry,
//! request identity resolution, error rendering and the HTTP handlers.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use handlers::configure_routes;
pub use state::AppState;
