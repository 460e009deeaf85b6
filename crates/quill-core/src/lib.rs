//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, the authorization rule table and the application services
//! that tie them together.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod query;
pub mod services;

pub use error::DomainError;
