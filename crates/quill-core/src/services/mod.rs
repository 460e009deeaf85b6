//! Application services - one per resource, each driving ports and the policy table.
//!
//! Callers are passed in explicitly as a resolved [`User`](crate::domain::User);
//! resolving a request to a user is the transport layer's job.

mod accounts;
mod comments;
mod posts;

pub use accounts::{
    AccountService, LoginOutcome, NewAccount, PasswordChange, ProfileChanges, RefreshedAccess,
};
pub use comments::CommentService;
pub use posts::{NewPost, PostChanges, PostService};
