use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post, User, validate_content};
use crate::error::{DomainError, RepoError};
use crate::policy::{self, CommentAction};
use crate::ports::{BaseRepository, CommentRepository, PostRepository};
use crate::query::{CommentQuery, Page};

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn create(
        &self,
        caller: &User,
        post_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        let post = self.find_post(post_id).await?;
        policy::ensure_commentable(&post)?;
        validate_content(&content)?;

        let comment = Comment::new(post.id, caller.id, content);
        let saved = self.comments.insert(comment).await?;

        tracing::info!(
            user_id = %caller.id,
            post_id = %post.id,
            comment_id = %saved.id,
            "Comment created"
        );
        Ok(saved)
    }

    /// Comments on a post; public, so no caller is involved.
    pub async fn list(&self, mut query: CommentQuery) -> Result<Page<Comment>, DomainError> {
        let post = self.find_post(query.post_id).await?;
        query.post_id = post.id;

        let page = self.comments.list(&query).await?;
        page.ensure_in_range()
    }

    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.find_comment(id).await?;
        // The parent post may have been removed between the two lookups.
        self.find_post(comment.post_id).await?;
        policy::authorize_comment(caller, &comment, CommentAction::Edit)?;
        validate_content(&content)?;

        comment.content = content;
        comment.touch();

        let saved = self.comments.update(comment).await.map_err(gone_comment)?;
        tracing::info!(user_id = %caller.id, comment_id = %saved.id, "Comment updated");
        Ok(saved)
    }

    pub async fn delete(&self, caller: &User, id: Uuid) -> Result<(), DomainError> {
        let comment = self.find_comment(id).await?;
        policy::authorize_comment(caller, &comment, CommentAction::Delete)?;

        self.comments
            .delete(comment.id)
            .await
            .map_err(gone_comment)?;
        tracing::info!(user_id = %caller.id, comment_id = %comment.id, "Comment deleted");
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post"))
    }

    async fn find_comment(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment"))
    }
}

fn gone_comment(e: RepoError) -> DomainError {
    match e {
        RepoError::NotFound => DomainError::not_found("Comment"),
        other => other.into(),
    }
}
