//! Account handlers: registration, login, token refresh and the caller's profile.

use actix_web::{HttpResponse, web};
use validator::Validate;

use quill_core::domain::User;
use quill_core::services::{NewAccount, PasswordChange, ProfileChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AccessTokenResponse, ChangePasswordRequest, LoginRequest, ProfileResponse, RefreshRequest,
    RegisterRequest, TokenPairResponse, UpdateProfileRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const TOKEN_TYPE: &str = "Bearer";

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let user = state
        .accounts
        .register(NewAccount {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        "User created successfully",
        profile_response(&user),
    )))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let outcome = state.accounts.login(&req.email, &req.password).await?;
    let message = format!("Login successful {}", outcome.user.first_name)
        .trim_end()
        .to_string();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        message,
        TokenPairResponse {
            access_token: outcome.tokens.access_token,
            refresh_token: outcome.tokens.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: outcome.tokens.expires_in,
        },
    )))
}

/// POST /token/refresh
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let access = state.accounts.refresh(&req.refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Token refreshed successfully",
        AccessTokenResponse {
            access_token: access.access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: access.expires_in,
        },
    )))
}

/// GET /profile
pub async fn profile(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "User profile retrieved successfully",
        profile_response(&identity.user),
    )))
}

/// PUT /profile
pub async fn update_profile(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let user = state
        .accounts
        .update_profile(
            &identity.user,
            ProfileChanges {
                first_name: req.first_name,
                last_name: req.last_name,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "User profile updated successfully",
        profile_response(&user),
    )))
}

/// PUT /profile/change-password
pub async fn change_password(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    state
        .accounts
        .change_password(
            &identity.user,
            PasswordChange {
                current_password: req.current_password,
                new_password: req.new_password,
                confirm_password: req.confirm_password,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password updated successfully")))
}

/// DELETE /profile/delete-account
pub async fn delete_account(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    state.accounts.delete_account(&identity.user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "Account associated with {} deleted successfully",
        identity.user.email
    ))))
}

pub(crate) fn profile_response(user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}
