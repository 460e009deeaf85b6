//! Comment handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::Comment;
use quill_core::query::{CommentQuery, Ordering, PageRequest};
use quill_shared::ApiResponse;
use quill_shared::dto::{CommentListParams, CommentRequest, CommentResponse, format_timestamp};

use super::pagination;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /posts/{id}/comments
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let comment = state
        .comments
        .create(&identity.user, path.into_inner(), req.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        "Comment created successfully",
        comment_response(comment),
    )))
}

/// GET /posts/{id}/comments - public.
pub async fn list(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<CommentListParams>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();

    let query = CommentQuery {
        post_id: path.into_inner(),
        user_id: params.user,
        ordering: Ordering::parse_or(params.ordering.as_deref(), Ordering::OLDEST_FIRST),
        page: PageRequest::new(params.page, params.page_size)?,
    };

    let page = state.comments.list(query).await?;
    Ok(HttpResponse::Ok().json(pagination::envelope(&req, page.map(comment_response))))
}

/// PUT /comments/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let comment = state
        .comments
        .update(&identity.user, path.into_inner(), req.content)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Comment updated successfully",
        comment_response(comment),
    )))
}

/// DELETE /comments/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(&identity.user, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted successfully")))
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        content: comment.content,
        created_at: format_timestamp(&comment.created_at),
        updated_at: format_timestamp(&comment.updated_at),
    }
}
