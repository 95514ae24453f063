mod common;

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, Utc};
use common::cheap_credentials;
use recipe_portal::{
    auth::{
        self, Actor, AuthUser, SESSION_COOKIE, expired_session_cookie, is_safe_next, read_cookie,
        session_cookie, session_id_from, verify_session_token,
    },
    config::Env,
    flash::{FlashMessage, Level, decode_flash, encode_flash},
    models::{Session, User},
};
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn session(expires_in: Duration) -> Session {
    Session {
        id: Uuid::new_v4(),
        user_id: 7,
        expires_at: Utc::now() + expires_in,
    }
}

fn cookie_headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
    headers
}

// --- Session tokens ---

#[test]
fn test_session_token_round_trip_carries_ids() {
    let session = session(Duration::hours(1));
    let token = auth::issue_session_token(SECRET, &session).unwrap();

    let claims = verify_session_token(SECRET, &token).expect("valid token");
    assert_eq!(claims.sid, session.id);
    assert_eq!(claims.sub, 7);
}

#[test]
fn test_session_token_rejects_wrong_secret_and_expiry() {
    let live = auth::issue_session_token(SECRET, &session(Duration::hours(1))).unwrap();
    assert!(verify_session_token("another-secret", &live).is_none());

    let expired = auth::issue_session_token(SECRET, &session(Duration::hours(-2))).unwrap();
    assert!(verify_session_token(SECRET, &expired).is_none());

    assert!(verify_session_token(SECRET, "garbage").is_none());
}

#[test]
fn test_session_id_from_reads_named_cookie_only() {
    let session = session(Duration::hours(1));
    let token = auth::issue_session_token(SECRET, &session).unwrap();
    let headers = cookie_headers(&format!("theme=dark; {SESSION_COOKIE}={token}; flash=x"));

    assert_eq!(session_id_from(&headers, SECRET), Some(session.id));
    assert_eq!(read_cookie(&headers, "theme"), Some("dark"));
    assert_eq!(read_cookie(&headers, "missing"), None);
    assert_eq!(session_id_from(&HeaderMap::new(), SECRET), None);
}

#[test]
fn test_session_cookie_attributes_follow_env() {
    let local = session_cookie("tok", 3600, &Env::Local);
    assert!(local.starts_with("session=tok;"));
    assert!(local.contains("HttpOnly"));
    assert!(local.contains("SameSite=Lax"));
    assert!(local.contains("Max-Age=3600"));
    assert!(!local.contains("Secure"));

    let production = session_cookie("tok", 3600, &Env::Production);
    assert!(production.ends_with("; Secure"));

    assert!(expired_session_cookie().contains("Max-Age=0"));
}

#[test]
fn test_next_targets_must_be_local_paths() {
    assert!(is_safe_next("/recipe/3"));
    assert!(is_safe_next("/my-recipes?page=2"));
    assert!(!is_safe_next("//evil.example"));
    assert!(!is_safe_next("https://evil.example"));
    assert!(!is_safe_next("/\\evil.example"));
    assert!(!is_safe_next(""));
}

// --- Identity ---

#[test]
fn test_auth_user_from_user_drops_hash() {
    let user = User {
        id: 3,
        username: "alice".to_string(),
        password_hash: "$argon2id$...".to_string(),
        is_admin: true,
        created_at: Utc::now(),
    };
    let auth_user = AuthUser::from(user);
    assert_eq!(
        auth_user,
        AuthUser {
            id: 3,
            username: "alice".to_string(),
            is_admin: true
        }
    );

    let actor = Actor::User(auth_user);
    assert!(actor.is_authenticated());
    assert_eq!(actor.user().map(|u| u.id), Some(3));
    assert!(Actor::default().user().is_none());
}

// --- Credentials ---

#[tokio::test]
async fn test_password_hash_verifies_only_the_original() {
    let credentials = cheap_credentials();
    let hash = credentials.hash("correct horse".to_string()).await.unwrap();

    assert_ne!(hash, "correct horse");
    assert!(credentials
        .verify("correct horse".to_string(), hash.clone())
        .await
        .unwrap());
    assert!(!credentials
        .verify("battery staple".to_string(), hash)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_hashes_are_salted() {
    let credentials = cheap_credentials();
    let first = credentials.hash("same".to_string()).await.unwrap();
    let second = credentials.hash("same".to_string()).await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_malformed_stored_hash_never_verifies() {
    let credentials = cheap_credentials();
    let verified = credentials
        .verify("anything".to_string(), "plaintext-password".to_string())
        .await
        .unwrap();
    assert!(!verified);
}

// --- Flash ---

#[test]
fn test_flash_cookie_round_trip_and_tamper() {
    let token = encode_flash(SECRET, &FlashMessage::success("Recipe added!")).unwrap();

    let decoded = decode_flash(SECRET, &token).expect("flash decodes");
    assert_eq!(decoded.level, Level::Success);
    assert_eq!(decoded.message, "Recipe added!");

    assert!(decode_flash("other-secret", &token).is_none());
    assert!(decode_flash(SECRET, "tampered").is_none());
}

#[test]
fn test_flash_levels_render_as_css_names() {
    assert_eq!(Level::Success.as_str(), "success");
    assert_eq!(Level::Danger.as_str(), "danger");
    assert_eq!(Level::Info.as_str(), "info");
    assert_eq!(FlashMessage::info("x").level, Level::Info);
}
