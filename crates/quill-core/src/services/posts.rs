use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, User, validate_content, validate_title};
use crate::error::{DomainError, RepoError};
use crate::policy::{self, PostAction};
use crate::ports::{BaseRepository, PostRepository};
use crate::query::{Page, PostQuery};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub is_published: bool,
}

/// Partial post update. The owner is fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn create(&self, caller: &User, input: NewPost) -> Result<Post, DomainError> {
        validate_title(&input.title)?;
        validate_content(&input.content)?;

        let post = Post::new(caller.id, input.title, input.content, input.is_published);
        let saved = self.posts.insert(post).await?;

        tracing::info!(user_id = %caller.id, post_id = %saved.id, "Post created");
        Ok(saved)
    }

    /// The caller's own posts. The owner filter is always forced to the caller.
    pub async fn list_own(
        &self,
        caller: &User,
        mut query: PostQuery,
    ) -> Result<Page<Post>, DomainError> {
        query.owner_id = caller.id;
        let page = self.posts.list(&query).await?;
        page.ensure_in_range()
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))
    }

    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let mut post = self.get(id).await?;
        policy::authorize_post(caller, &post, PostAction::Edit)?;

        if let Some(title) = changes.title {
            validate_title(&title)?;
            post.title = title;
        }
        if let Some(content) = changes.content {
            validate_content(&content)?;
            post.content = content;
        }
        if let Some(is_published) = changes.is_published {
            post.is_published = is_published;
        }
        post.touch();

        let saved = self.posts.update(post).await.map_err(gone_post)?;
        tracing::info!(user_id = %caller.id, post_id = %saved.id, "Post updated");
        Ok(saved)
    }

    pub async fn delete(&self, caller: &User, id: Uuid) -> Result<(), DomainError> {
        let post = self.get(id).await?;
        policy::authorize_post(caller, &post, PostAction::Delete)?;

        self.posts.delete(post.id).await.map_err(gone_post)?;
        tracing::info!(user_id = %caller.id, post_id = %post.id, "Post deleted");
        Ok(())
    }
}

fn gone_post(e: RepoError) -> DomainError {
    match e {
        RepoError::NotFound => DomainError::not_found("Post"),
        other => other.into(),
    }
}
