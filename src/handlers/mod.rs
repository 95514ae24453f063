//! Request handlers, one per route.
//!
//! Every handler follows the same shape: resolve the actor, apply the policy, call the
//! repository, then either render a `Page` or redirect with a flash message.

use axum::{
    extract::{FromRequestParts, Path},
    http::{HeaderValue, header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::RequestContext,
    error::AppError,
    flash::{FlashMessage, PendingFlash, Rendered},
    policy::Denial,
    views::{self, Chrome, Page, View},
};

pub mod account;
pub mod admin;
pub mod public;
pub mod recipes;

/// Outcome
///
/// What a successful handler produces: a rendered page, or a 303 redirect that may
/// carry a flash message and a `Set-Cookie` header.
#[derive(Debug)]
pub enum Outcome {
    Render(Box<Page>),
    Redirect {
        to: String,
        flash: Option<FlashMessage>,
        cookie: Option<String>,
    },
}

impl Outcome {
    pub fn redirect(to: impl Into<String>) -> Self {
        Outcome::Redirect {
            to: to.into(),
            flash: None,
            cookie: None,
        }
    }

    /// Attaches a flash message to a redirect. No effect on a rendered page.
    pub fn with_flash(mut self, message: FlashMessage) -> Self {
        if let Outcome::Redirect { flash, .. } = &mut self {
            *flash = Some(message);
        }
        self
    }

    pub fn with_cookie(mut self, value: String) -> Self {
        if let Outcome::Redirect { cookie, .. } = &mut self {
            *cookie = Some(value);
        }
        self
    }

    /// The redirect target, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        match self {
            Outcome::Redirect { to, .. } => Some(to),
            Outcome::Render(_) => None,
        }
    }

    pub fn flash(&self) -> Option<&FlashMessage> {
        match self {
            Outcome::Redirect { flash, .. } => flash.as_ref(),
            Outcome::Render(_) => None,
        }
    }

    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Render(page) => Some(&page.view),
            Outcome::Redirect { .. } => None,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render(page) => {
                let mut response = Html(views::render(&page)).into_response();
                response.extensions_mut().insert(Rendered);
                response
            }
            Outcome::Redirect { to, flash, cookie } => {
                let mut response = Redirect::to(&to).into_response();
                if let Some(flash) = flash {
                    response.extensions_mut().insert(PendingFlash(flash));
                }
                if let Some(cookie) = cookie {
                    match HeaderValue::from_str(&cookie) {
                        Ok(value) => {
                            response.headers_mut().append(header::SET_COOKIE, value);
                        }
                        Err(e) => tracing::error!("invalid session cookie header: {:?}", e),
                    }
                }
                response
            }
        }
    }
}

/// Id
///
/// A numeric `{id}` path segment. Anything that does not parse as an id is a 404,
/// the same as an id that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct Id(pub i64);

impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Id(id))
            .map_err(|_| AppError::NotFound)
    }
}

/// Wraps a view in the site chrome. The navigation categories are loaded here so
/// every rendered page carries them.
pub(crate) async fn render(
    state: &AppState,
    ctx: RequestContext,
    view: View,
) -> Result<Outcome, AppError> {
    let categories = state.repo.list_categories().await?;
    Ok(Outcome::Render(Box::new(Page {
        view,
        chrome: Chrome {
            actor: ctx.actor,
            flash: ctx.flash,
            categories,
        },
    })))
}

/// Turns a policy denial into the user-facing redirect.
pub(crate) fn deny(denial: Denial, back_to: impl Into<String>) -> AppError {
    let message = match denial {
        Denial::NotOwner => "You do not have permission to modify this recipe.",
        Denial::NotAdmin => "You do not have permission to access this page.",
        Denial::SelfTarget => "You cannot perform this action on your own account.",
        Denial::CategoryInUse => {
            "This category still has recipes. Delete or move them first."
        }
    };
    AppError::denied(message, back_to)
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
