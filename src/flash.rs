//! One-shot status messages carried across a redirect.
//!
//! A redirect response marks itself with `PendingFlash`; `flash_middleware` signs the
//! message into the `flash` cookie. On the next request the middleware verifies the
//! cookie and exposes it as `IncomingFlash`, and clears it once a page rendered it.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{auth::read_cookie, config::AppConfig};

pub const FLASH_COOKIE: &str = "flash";

// Long enough to survive a redirect, short enough to never resurface later.
const FLASH_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Danger => "danger",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct FlashClaims {
    level: Level,
    message: String,
    exp: usize,
}

/// Response marker: sign this message into the flash cookie.
#[derive(Debug, Clone)]
pub struct PendingFlash(pub FlashMessage);

/// Response marker: a page was rendered, so any incoming flash has been shown.
#[derive(Debug, Clone, Copy)]
pub struct Rendered;

/// Request extension holding the verified flash from the incoming cookie, if any.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<FlashMessage>);

pub fn encode_flash(secret: &str, flash: &FlashMessage) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = FlashClaims {
        level: flash.level,
        message: flash.message.clone(),
        exp: (chrono::Utc::now().timestamp() + FLASH_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Tampered, expired or malformed cookies simply yield no message.
pub fn decode_flash(secret: &str, token: &str) -> Option<FlashMessage> {
    decode::<FlashClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| FlashMessage {
        level: data.claims.level,
        message: data.claims.message,
    })
}

/// flash_middleware
///
/// Wraps every route. Reads the incoming flash before the handler runs and
/// writes or clears the cookie on the way out.
pub async fn flash_middleware(
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw = read_cookie(request.headers(), FLASH_COOKIE).map(str::to_owned);
    let incoming = raw
        .as_deref()
        .and_then(|token| decode_flash(&config.secret_key, token));
    request.extensions_mut().insert(IncomingFlash(incoming));

    let mut response = next.run(request).await;

    let cookie = match response.extensions_mut().remove::<PendingFlash>() {
        Some(PendingFlash(flash)) => match encode_flash(&config.secret_key, &flash) {
            Ok(token) => Some(format!(
                "{FLASH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={FLASH_TTL_SECS}"
            )),
            Err(e) => {
                tracing::error!("failed to sign flash message: {:?}", e);
                None
            }
        },
        None if raw.is_some() && response.extensions().get::<Rendered>().is_some() => {
            Some(format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"))
        }
        None => None,
    };

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("invalid flash cookie header: {:?}", e),
        }
    }

    response
}
