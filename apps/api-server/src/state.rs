//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_core::services::{AccountService, CommentService, PostService};
use quill_infra::{
    InMemoryStore, PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};
use quill_infra::auth::{Argon2PasswordService, JwtTokenService};
use quill_infra::database;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub comments: CommentService,
    /// Name of the storage backend, reported by the health check.
    pub storage: &'static str,
}

/// The repository set the services are wired against.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// All three repositories backed by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}

impl AppState {
    pub fn new(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        storage: &'static str,
    ) -> Self {
        Self {
            accounts: AccountService::new(repos.users, passwords, tokens),
            posts: PostService::new(repos.posts.clone()),
            comments: CommentService::new(repos.posts, repos.comments),
            storage,
        }
    }

    /// Build the application state from configuration.
    ///
    /// A configured database that cannot be reached is a start-up failure;
    /// without `DATABASE_URL` the server runs on the in-memory store.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let (repos, storage) = match &config.database {
            Some(db_config) => {
                let conn = database::connect(db_config).await?;
                let repos = Repositories {
                    users: Arc::new(PostgresUserRepository::new(conn.clone())),
                    posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(conn)),
                };
                (repos, "postgres")
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (Repositories::in_memory(Arc::new(InMemoryStore::new())), "memory")
            }
        };

        tracing::info!(storage, "Application state initialized");
        Ok(Self::new(repos, passwords, tokens, storage))
    }
}
