use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::{
    AppState,
    auth::{self, RequestContext},
    error::AppError,
    flash::FlashMessage,
    forms::{LoginForm, RegisterForm},
    models::NewUser,
    repository::RepositoryError,
    views::View,
};

use super::{Outcome, render};

const LOGIN_FAILED: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn safe_next(next: Option<String>) -> Option<String> {
    next.filter(|n| auth::is_safe_next(n))
}

fn login_path(next: Option<&str>) -> String {
    match next {
        Some(next) => {
            let query = serde_urlencoded::to_string([("next", next)]).unwrap_or_default();
            format!("/login?{query}")
        }
        None => "/login".to_string(),
    }
}

pub async fn register_form(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    if ctx.actor.is_authenticated() {
        return Ok(Outcome::redirect("/"));
    }
    render(&state, ctx, View::Register).await
}

/// register
///
/// [Public Route] Creates a member account. The password is hashed before the row is
/// written; the username must not exist yet (exact, case-sensitive match).
pub async fn register(
    ctx: RequestContext,
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Outcome, AppError> {
    if ctx.actor.is_authenticated() {
        return Ok(Outcome::redirect("/"));
    }

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), "/register"))?;

    if state
        .repo
        .find_user_by_username(&input.username)
        .await?
        .is_some()
    {
        return Err(AppError::invalid("This username is already taken.", "/register"));
    }

    let password_hash = state.credentials.hash(input.password).await?;
    let user = state
        .repo
        .create_user(NewUser {
            username: input.username,
            password_hash,
            is_admin: false,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::DuplicateUsername => {
                AppError::invalid("This username is already taken.", "/register")
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "user registered");
    Ok(Outcome::redirect("/login")
        .with_flash(FlashMessage::success("Registration successful. You can now log in.")))
}

pub async fn login_form(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> Result<Outcome, AppError> {
    if ctx.actor.is_authenticated() {
        return Ok(Outcome::redirect("/"));
    }
    let next = safe_next(query.next);
    render(&state, ctx, View::Login { next }).await
}

/// login
///
/// [Public Route] Verifies the credentials and opens a server-side session.
///
/// Unknown usernames and wrong passwords produce the same message. On success the
/// user is sent to `next` when it is a local path, otherwise to the home page.
pub async fn login(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Outcome, AppError> {
    if ctx.actor.is_authenticated() {
        return Ok(Outcome::redirect("/"));
    }

    let next = safe_next(form.next.filter(|n| !n.is_empty()).or(query.next));

    let found = state.repo.find_user_by_username(&form.username).await?;
    let verified = match &found {
        Some(user) => {
            state
                .credentials
                .verify(form.password, user.password_hash.clone())
                .await?
        }
        None => false,
    };

    let user = match found {
        Some(user) if verified => user,
        _ => {
            tracing::info!(username = %form.username, "login failed");
            return Err(AppError::invalid(LOGIN_FAILED, login_path(next.as_deref())));
        }
    };

    let ttl = Duration::hours(state.config.session_ttl_hours);
    let session = state.repo.create_session(user.id, Utc::now() + ttl).await?;
    let token = auth::issue_session_token(&state.config.secret_key, &session)?;
    let cookie = auth::session_cookie(&token, ttl.num_seconds(), &state.config.env);

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Outcome::redirect(next.unwrap_or_else(|| "/".to_string()))
        .with_flash(FlashMessage::success("Logged in successfully."))
        .with_cookie(cookie))
}

/// logout
///
/// Deletes the session row and expires the cookie. Served on GET and POST; a request
/// without a session simply lands on the home page.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Outcome, AppError> {
    let Some(session_id) = auth::session_id_from(&headers, &state.config.secret_key) else {
        return Ok(Outcome::redirect("/").with_cookie(auth::expired_session_cookie()));
    };

    state.repo.delete_session(session_id).await?;
    Ok(Outcome::redirect("/")
        .with_flash(FlashMessage::info("You have been logged out."))
        .with_cookie(auth::expired_session_cookie()))
}
