//! Account, login, refresh and revoke flows over HTTP

mod common;

use common::{spawn_app, TEST_SECRET};
use chirpy::auth::AccessTokenCodec;
use serde_json::{json, Value};

#[tokio::test]
async fn create_user_returns_201_without_password() {
    let app = spawn_app();

    let response = app.create_user("walt@breakingbad.com", "04234").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_returns_400_for_invalid_input() {
    let app = spawn_app();
    let cases = vec![
        ("not-an-email", "04234", "invalid email"),
        ("", "04234", "empty email"),
        ("walt@breakingbad.com", "", "empty password"),
    ];

    for (email, password, description) in cases {
        let response = app.create_user(email, password).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "API did not reject {}",
            description
        );
    }
}

#[tokio::test]
async fn create_user_returns_400_for_malformed_json() {
    let app = spawn_app();

    let response = app
        .client
        .post(app.url("/api/users"))
        .header("Content-Type", "application/json")
        .body(r#"{"email": "walt@breakingbad.com""#)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_409_for_duplicate_email() {
    let app = spawn_app();

    assert_eq!(201, app.create_user("walt@breakingbad.com", "04234").await.status().as_u16());
    let response = app.create_user("walt@breakingbad.com", "other").await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn login_returns_both_tokens() {
    let app = spawn_app();
    let created: Value = app
        .create_user("saul@bettercall.com", "123456")
        .await
        .json()
        .await
        .unwrap();

    let response = app.login("saul@bettercall.com", "123456", None).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["email"], "saul@bettercall.com");

    let token = body["token"].as_str().expect("access token missing");
    let refresh_token = body["refresh_token"].as_str().expect("refresh token missing");
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));

    let codec = AccessTokenCodec::new(TEST_SECRET, "chirpy");
    let user_id = codec.validate(token).expect("access token should validate");
    assert_eq!(user_id.to_string(), created["id"].as_str().unwrap());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;

    let wrong_password = app.login("saul@bettercall.com", "wrong", None).await;
    let unknown_email = app.login("nobody@bettercall.com", "123456", None).await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["error"], b["error"]);
    assert_eq!(a["code"], b["code"]);
}

#[tokio::test]
async fn login_clamps_requested_lifetime() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;
    let codec = AccessTokenCodec::new(TEST_SECRET, "chirpy");

    let cases = vec![(Some(60), 60), (Some(-5), 3600), (Some(999_999), 3600), (None, 3600)];

    for (requested, expected) in cases {
        let body: Value = app
            .login("saul@bettercall.com", "123456", requested)
            .await
            .json()
            .await
            .unwrap();
        let claims = codec.decode(body["token"].as_str().unwrap()).unwrap();

        assert_eq!(claims.exp - claims.iat, expected, "requested {:?}", requested);
    }
}

#[tokio::test]
async fn refresh_then_revoke_then_refresh_fails() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let codec = AccessTokenCodec::new(TEST_SECRET, "chirpy");
    assert!(codec.validate(body["token"].as_str().unwrap()).is_ok());

    // Not rotated: the same refresh token still works.
    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());

    let response = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());
    assert!(response.text().await.unwrap().is_empty());

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());

    // Revoking twice is harmless.
    let response = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());
}

#[tokio::test]
async fn refresh_ignores_login_lifetime() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;
    let session: Value = app
        .login("saul@bettercall.com", "123456", Some(60))
        .await
        .json()
        .await
        .unwrap();

    let body: Value = app
        .post_with_bearer("/api/refresh", session["refresh_token"].as_str().unwrap())
        .await
        .json()
        .await
        .unwrap();

    let claims = AccessTokenCodec::new(TEST_SECRET, "chirpy")
        .decode(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn refresh_rejects_unknown_and_access_tokens() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let response = app.post_with_bearer("/api/refresh", "deadbeef").await;
    assert_eq!(401, response.status().as_u16());

    // An access token is not a refresh token.
    let response = app
        .post_with_bearer("/api/refresh", session["token"].as_str().unwrap())
        .await;
    assert_eq!(401, response.status().as_u16());

    let response = app.post_with_bearer("/api/revoke", "deadbeef").await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_and_revoke_require_authorization_header() {
    let app = spawn_app();

    for path in ["/api/refresh", "/api/revoke"] {
        let response = app
            .client
            .post(app.url(path))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(400, response.status().as_u16(), "{}", path);

        let response = app
            .client
            .post(app.url(path))
            .header("Authorization", "Basic abc")
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(400, response.status().as_u16(), "{}", path);
    }
}

#[tokio::test]
async fn login_with_extra_fields_is_accepted() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;

    let response = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({
            "email": "saul@bettercall.com",
            "password": "123456",
            "remember_me": true
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}
