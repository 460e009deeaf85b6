//! Request-level plumbing: identity extraction and error rendering.

pub mod auth;
pub mod error;

pub use auth::Identity;
pub use error::{AppError, AppResult};
