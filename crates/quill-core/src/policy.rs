//! Authorization rule table.
//!
//! Every check compares the resolved caller against the resource it wants to
//! touch. The checks are pure: no I/O and no framework types.
//!
//! | Action         | Allowed when                                  |
//! |----------------|-----------------------------------------------|
//! | edit post      | caller owns the post                          |
//! | delete post    | caller owns the post, or is a superuser       |
//! | edit comment   | caller owns the comment                       |
//! | delete comment | caller owns the comment, or is staff/superuser|
//! | create comment | the post is published                         |

use crate::domain::{Comment, Post, User};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Edit,
    Delete,
}

pub fn can_act_on_post(caller: &User, post: &Post, action: PostAction) -> bool {
    let owner = caller.id == post.user_id;
    match action {
        PostAction::Edit => owner,
        PostAction::Delete => owner || caller.is_superuser,
    }
}

pub fn can_act_on_comment(caller: &User, comment: &Comment, action: CommentAction) -> bool {
    let owner = caller.id == comment.user_id;
    match action {
        CommentAction::Edit => owner,
        CommentAction::Delete => owner || caller.is_staff || caller.is_superuser,
    }
}

pub fn authorize_post(caller: &User, post: &Post, action: PostAction) -> Result<(), DomainError> {
    if can_act_on_post(caller, post, action) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %caller.id,
        post_id = %post.id,
        ?action,
        "Post access denied"
    );
    Err(DomainError::Forbidden(match action {
        PostAction::Edit => "You do not have permission to edit this post".to_string(),
        PostAction::Delete => "You do not have permission to delete this post".to_string(),
    }))
}

pub fn authorize_comment(
    caller: &User,
    comment: &Comment,
    action: CommentAction,
) -> Result<(), DomainError> {
    if can_act_on_comment(caller, comment, action) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %caller.id,
        comment_id = %comment.id,
        ?action,
        "Comment access denied"
    );
    Err(DomainError::Forbidden(match action {
        CommentAction::Edit => "You do not have permission to edit this comment".to_string(),
        CommentAction::Delete => "You do not have permission to delete this comment".to_string(),
    }))
}

/// Comments may only be attached to published posts.
pub fn ensure_commentable(post: &Post) -> Result<(), DomainError> {
    if post.is_published {
        Ok(())
    } else {
        Err(DomainError::BadRequest(
            "Cannot comment on an unpublished post".to_string(),
        ))
    }
}
