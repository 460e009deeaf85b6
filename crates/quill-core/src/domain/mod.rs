//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::Comment;
pub use post::{MAX_TITLE_LENGTH, Post};
pub use user::{MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, User};

pub(crate) use post::{validate_content, validate_title};
pub(crate) use user::{validate_name, validate_password};
