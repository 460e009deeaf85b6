//! HTTP handlers and route configuration.

mod accounts;
mod comments;
mod health;
mod pagination;
mod posts;

use actix_web::{HttpRequest, error, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/register", web::post().to(accounts::register))
        .route("/login", web::post().to(accounts::login))
        .route("/token/refresh", web::post().to(accounts::refresh))
        // Account routes
        .service(
            web::resource("/profile")
                .route(web::get().to(accounts::profile))
                .route(web::put().to(accounts::update_profile)),
        )
        .route(
            "/profile/change-password",
            web::put().to(accounts::change_password),
        )
        .route(
            "/profile/delete-account",
            web::delete().to(accounts::delete_account),
        )
        // Posts
        .service(
            web::resource("/posts")
                .route(web::post().to(posts::create))
                .route(web::get().to(posts::list)),
        )
        .service(
            web::resource("/posts/{id}")
                .route(web::get().to(posts::retrieve))
                .route(web::put().to(posts::update))
                .route(web::delete().to(posts::delete)),
        )
        // Comments
        .service(
            web::resource("/posts/{id}/comments")
                .route(web::post().to(comments::create))
                .route(web::get().to(comments::list)),
        )
        .service(
            web::resource("/comments/{id}")
                .route(web::put().to(comments::update))
                .route(web::delete().to(comments::delete)),
        );
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid query parameters: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Unmatched path parameter: {}", err);
    AppError::NotFound("Not found".to_string()).into()
}
