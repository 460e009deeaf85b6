//! SeaORM entities and conversions to and from domain types.

pub mod comment;
pub mod post;
pub mod user;
