use crate::{AppState, handlers::recipes};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Member features: commenting and managing one's own recipes. The router is wrapped
/// in `auth_middleware`, and every handler also takes `AuthUser`, so an anonymous
/// request is redirected to the login page before any handler logic runs.
///
/// Ownership (owner or admin) is checked inside the edit and delete handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /recipe/{id}/comment
        // Form fields: body (required), rating (optional, 1-5).
        .route("/recipe/{id}/comment", post(recipes::add_comment))
        .route("/my-recipes", get(recipes::my_recipes))
        // GET/POST /recipe/add
        // Multipart form with an optional `image` file part.
        .route(
            "/recipe/add",
            get(recipes::add_recipe_form).post(recipes::add_recipe),
        )
        .route(
            "/recipe/{id}/edit",
            get(recipes::edit_recipe_form).post(recipes::edit_recipe),
        )
        .route("/recipe/{id}/delete", post(recipes::delete_recipe))
}
