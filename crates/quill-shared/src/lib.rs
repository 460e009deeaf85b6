//! # Quill Shared
//!
//! Wire types shared by the server and any Rust client: request and response
//! DTOs plus the JSON envelopes every endpoint answers with.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, PageResponse};
