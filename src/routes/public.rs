use crate::{
    AppState,
    handlers::{account, public},
};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Browsing, the static pages and the account gateway. The actor is still resolved
/// for these routes so the navigation can show who is logged in.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(public::health))
        // GET /
        // Latest recipes plus the category list.
        .route("/", get(public::index))
        .route("/category/{slug}", get(public::category))
        .route("/recipe/{id}", get(public::recipe_detail))
        .route("/about", get(public::about))
        .route("/contact", get(public::contact))
        .route("/testimonials", get(public::testimonials))
        // Account gateway. Logged-in visitors are sent back to the home page.
        .route(
            "/register",
            get(account::register_form).post(account::register),
        )
        .route("/login", get(account::login_form).post(account::login))
        // Logout works without a session too, so it lives here rather than behind auth.
        .route("/logout", get(account::logout).post(account::logout))
}
