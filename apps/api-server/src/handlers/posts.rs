//! Post handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::Post;
use quill_core::query::{Ordering, PageRequest, PostQuery};
use quill_core::services::{NewPost, PostChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CreatePostRequest, PostListParams, PostResponse, UpdatePostRequest, format_timestamp,
};

use super::pagination;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /posts
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = state
        .posts
        .create(
            &identity.user,
            NewPost {
                title: req.title,
                content: req.content,
                is_published: req.is_published,
            },
        )
        .await?;

    let author = match identity.user.full_name() {
        name if name.is_empty() => identity.user.email.clone(),
        name => name,
    };

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        format!("Post created successfully by {}", author),
        post_response(post),
    )))
}

/// GET /posts - the caller's own posts.
pub async fn list(
    identity: Identity,
    state: web::Data<AppState>,
    params: web::Query<PostListParams>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();

    let query = PostQuery {
        owner_id: identity.user.id,
        is_published: params.is_published,
        title: params.title,
        ordering: Ordering::parse_or(params.ordering.as_deref(), Ordering::NEWEST_FIRST),
        page: PageRequest::new(params.page, params.page_size)?,
    };

    let page = state.posts.list_own(&identity.user, query).await?;
    Ok(HttpResponse::Ok().json(pagination::envelope(&req, page.map(post_response))))
}

/// GET /posts/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Post retrieved successfully",
        post_response(post),
    )))
}

/// PUT /posts/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = state
        .posts
        .update(
            &identity.user,
            path.into_inner(),
            PostChanges {
                title: req.title,
                content: req.content,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Post updated successfully",
        post_response(post),
    )))
}

/// DELETE /posts/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.user, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        user_id: post.user_id,
        title: post.title,
        content: post.content,
        is_published: post.is_published,
        created_at: format_timestamp(&post.created_at),
        updated_at: format_timestamp(&post.updated_at),
    }
}
