#![cfg(feature = "ssr")]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use nexar::models::OtpType;
use nexar::services::identity::{IdentityClient, IdentityError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn session_body(access: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": "fresh-refresh",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "user": { "id": "user-1", "email": "ana@nexar.ro", "email_confirmed_at": "2026-10-19T10:00:00Z" }
    })
}

async fn client() -> (MockServer, IdentityClient) {
    let server = MockServer::start().await;
    let client = IdentityClient::new(format!("{}/", server.uri()), ANON_KEY);
    (server, client)
}

#[tokio::test]
async fn verify_otp_posts_type_and_hash() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/verify"))
        .and(header("apikey", ANON_KEY))
        .and(body_json(json!({ "type": "email", "token_hash": "hash-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("new-access")))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.verify_otp("hash-1", OtpType::Email).await.unwrap();

    assert_eq!(session.access_token, "new-access");
    assert_eq!(session.user.email.as_deref(), Some("ana@nexar.ro"));
    assert!(!session.is_expired(1_800_000_000));
    assert!(session.is_expired(1_900_000_000));
}

#[tokio::test]
async fn verify_otp_decodes_provider_error() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/verify"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": 403,
            "error_code": "otp_expired",
            "msg": "Email link is invalid or has expired"
        })))
        .mount(&server)
        .await;

    let err = client.verify_otp("hash-1", OtpType::Signup).await.unwrap_err();

    match &err {
        IdentityError::Api { code, message, .. } => {
            assert_eq!(code.as_deref(), Some("otp_expired"));
            assert_eq!(message, "Email link is invalid or has expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_auth_rejection());
}

#[tokio::test]
async fn set_session_keeps_valid_access_token() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer link-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "email": "ana@nexar.ro"
        })))
        .mount(&server)
        .await;

    let session = client
        .set_session("link-access", "link-refresh", Some(1_900_000_000))
        .await
        .unwrap();

    assert_eq!(session.access_token, "link-access");
    assert_eq!(session.refresh_token, "link-refresh");
    assert_eq!(session.user.id, "user-1");
    assert_eq!(session.expires_at, Some(1_900_000_000));
}

fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": "user-1", "exp": exp }).to_string());
    format!("{header}.{claims}.signature")
}

#[tokio::test]
async fn session_from_link_expires_with_its_token() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&server)
        .await;

    let access = jwt_with_exp(1_900_000_000);
    let session = client.set_session(&access, "rt", None).await.unwrap();

    assert_eq!(session.expires_at, Some(1_900_000_000));
    assert!(!session.is_expired(1_899_999_999));
    assert!(session.is_expired(1_900_000_000));
}

#[tokio::test]
async fn opaque_link_token_still_expires() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&server)
        .await;

    let session = client.set_session("at", "rt", None).await.unwrap();

    assert!(session.expires_at.is_some());
    assert!(session.is_expired(32_503_680_000));
}

#[tokio::test]
async fn set_session_refreshes_rejected_access_token() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "JWT expired"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "link-refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("refreshed")))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.set_session("stale", "link-refresh", None).await.unwrap();

    assert_eq!(session.access_token, "refreshed");
}

#[tokio::test]
async fn set_session_does_not_refresh_on_server_error() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.set_session("a", "r", None).await.unwrap_err();

    assert!(!err.is_auth_rejection());
}

#[tokio::test]
async fn resend_signup_sends_redirect_target() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/resend"))
        .and(query_param("redirect_to", "https://nexar.ro/auth/confirm"))
        .and(body_json(json!({ "type": "signup", "email": "ana@nexar.ro" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .resend_signup("ana@nexar.ro", "https://nexar.ro/auth/confirm")
        .await
        .unwrap();
}

#[tokio::test]
async fn resend_rate_limit_surfaces_message() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/resend"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "code": 429,
            "error_code": "over_email_send_rate_limit",
            "msg": "For security purposes, you can only request this after 60 seconds."
        })))
        .mount(&server)
        .await;

    let err = client
        .resend_signup("ana@nexar.ro", "https://nexar.ro/auth/confirm")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("60 seconds"));
    assert_eq!(err.code(), Some("over_email_send_rate_limit"));
    assert!(err.user_message().contains("prea multe cereri"));
}

#[tokio::test]
async fn error_without_body_falls_back_to_status() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client.sign_out("access").await.unwrap_err();

    assert!(err.to_string().contains("502"));
}
