use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Identity, sessions and the request context extractors.
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod storage;
pub mod uploads;
pub mod views;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use credentials::Credentials;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, StorageState};

/// AppState
///
/// The single, cloneable container of everything a request may need. Shared across
/// all requests; individual parts are pulled out by extractors through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence, behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Where accepted uploads are written.
    pub storage: StorageState,
    /// Password hashing and verification.
    pub credentials: Credentials,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the member and admin routers. Extracting `AuthUser` resolves the session;
/// an anonymous request is rejected with a redirect to `/login?next=<path>` before
/// the handler runs. The resolved actor is cached for the handler's own extractors.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the three routers, the static upload directory, the flash and auth
/// middleware, the body size cap and the observability layers.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let uploads = ServeDir::new(state.config.upload_dir.clone());
    let max_body = state.config.max_upload_bytes;

    // 1. Base Router Assembly
    let base_router = Router::new()
        // Public Routes: the actor is resolved but not required.
        .merge(public::public_routes())
        // Authenticated Routes: protected by `auth_middleware`.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin Routes: same authentication layer, admin flag checked in the handlers.
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Stored recipe images.
        .nest_service("/static/uploads", uploads)
        .fallback(handlers::not_found)
        // Flash cookie in/out for every response, including errors and redirects.
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            flash::flash_middleware,
        ))
        // Oversized bodies are refused before any handler reads them.
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state);

    // 2. Observability and Correlation Layers (Applied outermost/first)
    base_router.layer(
        ServiceBuilder::new()
            // 2a. Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // 2b. Request Tracing: one span per request carrying the request id.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 2c. Request ID Propagation: echo x-request-id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span from the method, URI and `x-request-id`, so every
/// log line for one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
