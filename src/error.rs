use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::{
    credentials::CredentialError,
    flash::{FlashMessage, PendingFlash},
    repository::RepositoryError,
    views,
};

/// AppError
///
/// The handler-level failure taxonomy.
///
/// * `Validation` and `Denied` are recovered locally: the user is sent back to
///   `back_to` with a message and nothing was written.
/// * `LoginRequired` sends the user to the login page, remembering `next`.
/// * `NotFound` renders the 404 page.
/// * Everything else is a fault: logged, any open transaction already rolled back
///   when it was dropped, and the 500 page rendered.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, back_to: String },
    #[error("{message}")]
    Denied { message: String, back_to: String },
    #[error("login required for {next}")]
    LoginRequired { next: String },
    #[error("not found")]
    NotFound,
    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("repository error: {0}")]
    Repository(#[source] RepositoryError),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            back_to: back_to.into(),
        }
    }

    pub fn denied(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        AppError::Denied {
            message: message.into(),
            back_to: back_to.into(),
        }
    }
}

/// Conditions a handler did not map itself. `NotFound` keeps its meaning; the
/// remaining domain conditions reaching this point are treated as faults.
impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound,
            RepositoryError::Database(e) => AppError::Database(e),
            other => AppError::Repository(other),
        }
    }
}

fn redirect_with_flash(to: &str, flash: FlashMessage) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.extensions_mut().insert(PendingFlash(flash));
    response
}

/// Error pages do not show flash messages, so they are not marked `Rendered` and a
/// pending flash survives until the next regular page.
fn error_page(status: StatusCode) -> Response {
    (status, Html(views::error_page(status))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation { message, back_to } => {
                redirect_with_flash(&back_to, FlashMessage::danger(message))
            }
            AppError::Denied { message, back_to } => {
                tracing::warn!(back_to = %back_to, "request denied: {}", message);
                redirect_with_flash(&back_to, FlashMessage::danger(message))
            }
            AppError::LoginRequired { next } => {
                let query = serde_urlencoded::to_string(&[("next", next.as_str())])
                    .unwrap_or_default();
                redirect_with_flash(
                    &format!("/login?{query}"),
                    FlashMessage::info("Please log in to access this page."),
                )
            }
            AppError::NotFound => error_page(StatusCode::NOT_FOUND),
            AppError::Multipart(err) => {
                tracing::warn!("rejected multipart body: {}", err.body_text());
                error_page(err.status())
            }
            fault => {
                tracing::error!("unhandled fault: {:?}", fault);
                error_page(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
