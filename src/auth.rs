use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    flash::{FlashMessage, IncomingFlash},
    models::{Session, User},
    repository::RepositoryState,
};

pub const SESSION_COOKIE: &str = "session";

/// Claims
///
/// Payload of the signed session cookie. It only references a server-side session
/// row, so deleting that row (logout, user deletion) invalidates the cookie at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Session row id.
    pub sid: Uuid,
    /// User id the session was issued to.
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers receive it as an
/// explicit argument and pass it on to the policy and repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

/// Actor
///
/// Who is behind a request: nobody in particular, or a logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    User(AuthUser),
}

impl Actor {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Actor::User(user) => Some(user),
            Actor::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }
}

/// RequestContext
///
/// Everything a rendered page needs to know about the request besides its route
/// parameters: the actor and the flash message handed over by the previous redirect.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub actor: Actor,
    pub flash: Option<FlashMessage>,
}

impl RequestContext {
    pub fn for_user(user: &AuthUser) -> Self {
        Self {
            actor: Actor::User(user.clone()),
            flash: None,
        }
    }
}

// --- Session tokens & cookies ---

pub fn issue_session_token(secret: &str, session: &Session) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sid: session.id,
        sub: session.user_id,
        exp: session.expires_at.timestamp() as usize,
        iat: chrono::Utc::now().timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry. Any failure means "no session".
pub fn verify_session_token(secret: &str, token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn session_id_from(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    read_cookie(headers, SESSION_COOKIE)
        .and_then(|token| verify_session_token(secret, token))
        .map(|claims| claims.sid)
}

pub fn session_cookie(token: &str, max_age_secs: i64, env: &Env) -> String {
    let secure = if *env == Env::Production { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure}")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Finds a cookie value by name across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Only local absolute paths are accepted as post-login targets.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

// --- Extractors ---

/// Actor Extractor Implementation
///
/// 1. Reads and verifies the signed `session` cookie.
/// 2. Loads the unexpired session row together with its user.
/// 3. Checks the row still belongs to the user named in the token.
///
/// Missing or invalid cookies resolve to `Actor::Anonymous`. Only a storage failure
/// rejects the request. The result is cached in the request extensions so the auth
/// middleware and the handler share one lookup.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let claims = read_cookie(&parts.headers, SESSION_COOKIE)
            .and_then(|token| verify_session_token(&config.secret_key, token));

        let actor = match claims {
            Some(claims) => match repo.find_session_user(claims.sid).await? {
                Some(user) if user.id == claims.sub => Actor::User(user.into()),
                _ => Actor::Anonymous,
            },
            None => Actor::Anonymous,
        };

        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}

/// AuthUser Extractor Implementation
///
/// Resolves the `Actor` and rejects anonymous requests with a redirect to the login
/// page that remembers the requested path.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Actor::from_request_parts(parts, state).await? {
            Actor::User(user) => Ok(user),
            Actor::Anonymous => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".to_string());
                tracing::debug!(next = %next, "anonymous request to a protected route");
                Err(AppError::LoginRequired { next })
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;
        let flash = parts
            .extensions
            .get::<IncomingFlash>()
            .and_then(|incoming| incoming.0.clone());
        Ok(RequestContext { actor, flash })
    }
}
