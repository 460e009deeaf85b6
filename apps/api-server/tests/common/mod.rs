//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use api_server::state::{AppState, Repositories};
use quill_core::domain::User;
use quill_core::ports::{BaseRepository, UserRepository};
use quill_infra::InMemoryStore;
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

pub const PASSWORD: &str = "secret";

/// The initialized application under test.
pub trait TestService: Service<Request, Response = ServiceResponse, Error = actix_web::Error> {}

impl<S> TestService for S where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

/// Application state over a fresh in-memory store, with cheap password hashing.
pub fn test_state() -> (Arc<InMemoryStore>, AppState) {
    let store = Arc::new(InMemoryStore::new());
    let passwords = Arc::new(Argon2PasswordService::with_cost(1024, 1).unwrap());
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        ..JwtConfig::default()
    }));

    let state = AppState::new(
        Repositories::in_memory(store.clone()),
        passwords,
        tokens,
        "memory",
    );
    (store, state)
}

pub async fn test_app(state: AppState) -> impl TestService {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(api_server::configure_routes),
    )
    .await
}

/// Send a request and decode the JSON body.
pub async fn send(app: &impl TestService, req: Request) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub async fn register(app: &impl TestService, email: &str, first_name: &str) -> Value {
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "email": email,
            "password": PASSWORD,
            "first_name": first_name,
            "last_name": "Tester",
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

/// Log in and return the login response body.
pub async fn login(app: &impl TestService, email: &str, password: &str) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// Register a user and return a bearer access token for it.
pub async fn signup(app: &impl TestService, email: &str) -> String {
    register(app, email, "Test").await;
    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Create a post and return its id.
pub async fn create_post(
    app: &impl TestService,
    token: &str,
    title: &str,
    is_published: bool,
) -> String {
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": title,
            "content": "Body text",
            "is_published": is_published,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Flip account flags directly in the store.
pub async fn update_user(
    store: &Arc<InMemoryStore>,
    email: &str,
    change: impl FnOnce(&mut User),
) {
    let users: Arc<dyn UserRepository> = store.clone();
    let mut user = users.find_by_email(email).await.unwrap().unwrap();
    change(&mut user);
    users.update(user).await.unwrap();
}

/// The stored row for `email`, as a request would have resolved it.
pub async fn find_user(store: &Arc<InMemoryStore>, email: &str) -> User {
    let users: Arc<dyn UserRepository> = store.clone();
    users.find_by_email(email).await.unwrap().unwrap()
}
