//! Registration, login, token and profile endpoints.

mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

use quill_core::services::{PasswordChange, ProfileChanges};

use common::{PASSWORD, bearer, create_post, login, register, send, signup, test_app, test_state};

#[actix_web::test]
async fn test_register_returns_profile_without_password() {
    let (_store, state) = test_state();
    let app = test_app(state).await;

    let body = register(&app, "a@x.com", "Ada").await;

    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["first_name"], "Ada");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[actix_web::test]
async fn test_register_duplicate_email_is_validation_error() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;

    let req = TestRequest::post()
        .uri("/register")
        .set_json(json!({ "email": "a@X.com", "password": "other-secret" }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "A user with this email already exists");
}

#[actix_web::test]
async fn test_register_rejects_bad_input() {
    let (_store, state) = test_state();
    let app = test_app(state).await;

    let req = TestRequest::post()
        .uri("/register")
        .set_json(json!({ "email": "not-an-email", "password": "1234" }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("email:")));
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("password:")));
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let (_store, state) = test_state();
    let app = test_app(state).await;

    let req = TestRequest::post()
        .uri("/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[actix_web::test]
async fn test_login_issues_token_pair() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;

    let (status, body) = login(&app, "a@x.com", PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful Ada");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 300);
    assert!(body["data"]["access_token"].as_str().is_some());
    assert!(body["data"]["refresh_token"].as_str().is_some());
}

#[actix_web::test]
async fn test_login_records_last_login() {
    let (store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;
    login(&app, "a@x.com", PASSWORD).await;

    let mut seen = None;
    common::update_user(&store, "a@x.com", |user| seen = user.last_login).await;
    assert!(seen.is_some());
}

#[actix_web::test]
async fn test_login_failures() {
    let (store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;

    let (status, body) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = login(&app, "nobody@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::update_user(&store, "a@x.com", |user| user.is_active = false).await;

    // Inactive wins over the password check either way.
    let (status, body) = login(&app, "a@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User is not active");
    let (status, _) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_refresh_token_flow() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;
    let (_, body) = login(&app, "a@x.com", PASSWORD).await;
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let req = TestRequest::post()
        .uri("/token/refresh")
        .set_json(json!({ "refresh": refresh }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri("/profile")
        .insert_header(bearer(&new_access))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    // An access token is not a refresh token.
    let req = TestRequest::post()
        .uri("/token/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_token_cannot_authenticate() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    register(&app, "a@x.com", "Ada").await;
    let (_, body) = login(&app, "a@x.com", PASSWORD).await;
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri("/profile")
        .insert_header(bearer(&refresh))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[actix_web::test]
async fn test_profile_requires_authentication() {
    let (_store, state) = test_state();
    let app = test_app(state).await;

    let req = TestRequest::get().uri("/profile").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Authentication credentials were not provided"
    );

    let req = TestRequest::get()
        .uri("/profile")
        .insert_header(bearer("garbage"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_deactivated_user_token_is_rejected() {
    let (store, state) = test_state();
    let app = test_app(state).await;
    let token = signup(&app, "a@x.com").await;

    common::update_user(&store, "a@x.com", |user| user.is_active = false).await;

    let req = TestRequest::get()
        .uri("/profile")
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_update_profile_ignores_email() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    let token = signup(&app, "a@x.com").await;

    let req = TestRequest::put()
        .uri("/profile")
        .insert_header(bearer(&token))
        .set_json(json!({ "first_name": "Grace", "email": "evil@x.com" }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Grace");
    assert_eq!(body["data"]["last_name"], "Tester");
    assert_eq!(body["data"]["email"], "a@x.com");
}

#[actix_web::test]
async fn test_change_password() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    let token = signup(&app, "a@x.com").await;

    let cases = [
        (
            json!({ "current_password": PASSWORD }),
            "Both current and new passwords are required",
        ),
        (
            json!({
                "current_password": PASSWORD,
                "new_password": "brand-new",
                "confirm_password": "different",
            }),
            "New password and confirm password do not match",
        ),
        (
            json!({
                "current_password": "not-it",
                "new_password": "brand-new",
                "confirm_password": "brand-new",
            }),
            "Current password is incorrect",
        ),
    ];
    for (payload, message) in cases {
        let req = TestRequest::put()
            .uri("/profile/change-password")
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], message);
    }

    let req = TestRequest::put()
        .uri("/profile/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({
            "current_password": PASSWORD,
            "new_password": "abc",
            "confirm_password": "abc",
        }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::put()
        .uri("/profile/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({
            "current_password": PASSWORD,
            "new_password": "brand-new",
            "confirm_password": "brand-new",
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = login(&app, "a@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "a@x.com", "brand-new").await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_overlapping_account_writes_keep_each_change() {
    let (store, state) = test_state();
    let app = test_app(state.clone()).await;
    register(&app, "a@x.com", "Ada").await;

    // Both writes start from the same resolved caller.
    let snapshot = common::find_user(&store, "a@x.com").await;
    login(&app, "a@x.com", PASSWORD).await;

    state
        .accounts
        .change_password(
            &snapshot,
            PasswordChange {
                current_password: Some(PASSWORD.to_string()),
                new_password: Some("brand-new".to_string()),
                confirm_password: Some("brand-new".to_string()),
            },
        )
        .await
        .unwrap();
    let updated = state
        .accounts
        .update_profile(
            &snapshot,
            ProfileChanges {
                first_name: Some("Grace".to_string()),
                last_name: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Grace");
    assert_eq!(updated.last_name, "Tester");
    assert!(updated.last_login.is_some());

    let (status, _) = login(&app, "a@x.com", "brand-new").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = login(&app, "a@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_delete_account_cascades() {
    let (_store, state) = test_state();
    let app = test_app(state).await;
    let token = signup(&app, "a@x.com").await;
    let post_id = create_post(&app, &token, "Mine", true).await;

    let req = TestRequest::delete()
        .uri("/profile/delete-account")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Account associated with a@x.com deleted successfully"
    );

    let req = TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = login(&app, "a@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let (_store, state) = test_state();
    let app = test_app(state).await;

    let req = TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
