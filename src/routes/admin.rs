use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Moderation and site management. Every mutating route is a POST.
///
/// Access Control:
/// The router is wrapped in the same authentication layer as the member routes;
/// the `is_admin` check happens inside each handler and redirects non-admins to the
/// home page with a message.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Dashboard with row counts.
        .route("/admin", get(admin::dashboard))
        // --- Recipes ---
        // Editing goes through /recipe/{id}/edit, where admins pass the ownership check.
        .route("/admin/recipes", get(admin::recipes))
        .route("/admin/recipes/{id}/delete", post(admin::delete_recipe))
        // --- Categories ---
        .route("/admin/categories", get(admin::categories))
        .route(
            "/admin/categories/add",
            get(admin::add_category_form).post(admin::add_category),
        )
        .route(
            "/admin/categories/{id}/edit",
            get(admin::edit_category_form).post(admin::edit_category),
        )
        .route("/admin/categories/{id}/delete", post(admin::delete_category))
        // --- Users ---
        // Self-targeting is refused for both actions.
        .route("/admin/users", get(admin::users))
        .route("/admin/users/{id}/toggle-admin", post(admin::toggle_admin))
        .route("/admin/users/{id}/delete", post(admin::delete_user))
        // --- Comments (delete only) ---
        .route("/admin/comments", get(admin::comments))
        .route("/admin/comments/{id}/delete", post(admin::delete_comment))
        // --- Pages ---
        .route("/admin/pages", get(admin::pages))
        .route(
            "/admin/pages/add",
            get(admin::add_page_form).post(admin::add_page),
        )
        .route(
            "/admin/pages/{id}/edit",
            get(admin::edit_page_form).post(admin::edit_page),
        )
        .route("/admin/pages/{id}/delete", post(admin::delete_page))
}
