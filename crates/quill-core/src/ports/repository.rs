use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::RepoError;
use crate::query::{CommentQuery, Page, PostQuery};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, cascading to dependent rows.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalised) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Record a successful login.
    async fn mark_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Write only the given name columns and `updated_at`, returning the stored row.
    async fn update_names(
        &self,
        id: Uuid,
        first_name: Option<String>,
        last_name: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<User, RepoError>;

    /// Replace the password hash, touching nothing but `updated_at`.
    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of a user's posts, filtered and ordered per the query.
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// One page of a post's comments, filtered and ordered per the query.
    async fn list(&self, query: &CommentQuery) -> Result<Page<Comment>, RepoError>;
}
