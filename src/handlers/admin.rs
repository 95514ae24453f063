//! Admin area.
//!
//! The router only checks that someone is logged in; every handler here applies the
//! admin gate itself before touching the repository.

use axum::{
    Form,
    extract::State,
};

use crate::{
    AppState,
    auth::{AuthUser, RequestContext},
    error::AppError,
    flash::FlashMessage,
    forms::{CategoryForm, PageForm},
    models::RecipeFilter,
    policy::{self, Denial},
    repository::RepositoryError,
    views::View,
};

use super::{Id, Outcome, deny, render};

const DUPLICATE_SLUG: &str = "This slug is already in use.";

fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    policy::require_admin(user).map_err(|d| {
        tracing::warn!(user_id = user.id, "non-admin attempted an admin operation");
        deny(d, "/")
    })
}

fn slug_conflict(err: RepositoryError, back_to: &str) -> AppError {
    match err {
        RepositoryError::DuplicateSlug => AppError::invalid(DUPLICATE_SLUG, back_to),
        other => other.into(),
    }
}

// --- Dashboard ---

/// dashboard
///
/// [Admin Route] Row counts for users, recipes, categories and comments.
pub async fn dashboard(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let stats = state.repo.get_stats().await?;
    render(&state, ctx, View::AdminDashboard { stats }).await
}

// --- Recipes ---

pub async fn recipes(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let recipes = state.repo.list_recipes(RecipeFilter::default()).await?;
    render(&state, ctx, View::AdminRecipes { recipes }).await
}

/// delete_recipe
///
/// [Admin Route] Removes any recipe regardless of owner and returns to the admin list.
pub async fn delete_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    state.repo.delete_recipe(id).await?;
    tracing::info!(recipe_id = id, admin_id = user.id, "recipe deleted by admin");
    Ok(Outcome::redirect("/admin/recipes").with_flash(FlashMessage::success("Recipe deleted.")))
}

// --- Categories ---

pub async fn categories(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let categories = state.repo.list_categories().await?;
    render(&state, ctx, View::AdminCategories { categories }).await
}

pub async fn add_category_form(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    render(&state, ctx, View::CategoryForm { category: None }).await
}

/// add_category
///
/// [Admin Route] Name and slug are required; the slug must be unused.
pub async fn add_category(
    user: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Outcome, AppError> {
    const BACK_TO: &str = "/admin/categories/add";
    require_admin(&user)?;

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), BACK_TO))?;
    let category = state
        .repo
        .create_category(input)
        .await
        .map_err(|e| slug_conflict(e, BACK_TO))?;
    tracing::info!(category_id = category.id, slug = %category.slug, "category created");

    Ok(Outcome::redirect("/admin/categories")
        .with_flash(FlashMessage::success("Category added!")))
}

pub async fn edit_category_form(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let category = state.repo.get_category(id).await?;
    render(
        &state,
        ctx,
        View::CategoryForm {
            category: Some(category),
        },
    )
    .await
}

pub async fn edit_category(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
    Form(form): Form<CategoryForm>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let back_to = format!("/admin/categories/{id}/edit");

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), back_to.as_str()))?;
    state
        .repo
        .update_category(id, input)
        .await
        .map_err(|e| slug_conflict(e, &back_to))?;

    Ok(Outcome::redirect("/admin/categories")
        .with_flash(FlashMessage::success("Category updated!")))
}

/// delete_category
///
/// [Admin Route] Refused while any recipe still belongs to the category.
pub async fn delete_category(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;

    match state.repo.delete_category(id).await {
        Ok(()) => Ok(Outcome::redirect("/admin/categories")
            .with_flash(FlashMessage::success("Category deleted."))),
        Err(RepositoryError::CategoryInUse) => {
            Err(deny(Denial::CategoryInUse, "/admin/categories"))
        }
        Err(e) => Err(e.into()),
    }
}

// --- Users ---

pub async fn users(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let users = state.repo.list_users().await?;
    render(&state, ctx, View::AdminUsers { users }).await
}

/// toggle_admin
///
/// [Admin Route] Flips another user's admin flag. Admins cannot change their own.
pub async fn toggle_admin(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    policy::require_not_self(&user, id).map_err(|_| {
        AppError::denied("You cannot change your own admin status.", "/admin/users")
    })?;

    let target = state.repo.toggle_admin(id).await?;
    tracing::info!(user_id = target.id, is_admin = target.is_admin, admin_id = user.id, "admin flag toggled");

    let message = if target.is_admin {
        format!("{} is now an admin.", target.username)
    } else {
        format!("{} is no longer an admin.", target.username)
    };
    Ok(Outcome::redirect("/admin/users").with_flash(FlashMessage::success(message)))
}

/// delete_user
///
/// [Admin Route] Deletes another user together with their recipes, comments and
/// sessions. Admins cannot delete themselves.
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    policy::require_not_self(&user, id)
        .map_err(|_| AppError::denied("You cannot delete your own account.", "/admin/users"))?;

    state.repo.delete_user(id).await?;
    tracing::info!(user_id = id, admin_id = user.id, "user deleted");

    Ok(Outcome::redirect("/admin/users").with_flash(FlashMessage::success("User deleted.")))
}

// --- Comments ---

pub async fn comments(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let comments = state.repo.list_comments(None).await?;
    render(&state, ctx, View::AdminComments { comments }).await
}

pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    state.repo.delete_comment(id).await?;
    Ok(Outcome::redirect("/admin/comments").with_flash(FlashMessage::success("Comment deleted.")))
}

// --- Pages ---

pub async fn pages(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let pages = state.repo.list_pages().await?;
    render(&state, ctx, View::AdminPages { pages }).await
}

pub async fn add_page_form(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    render(&state, ctx, View::PageForm { page: None }).await
}

pub async fn add_page(
    user: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> Result<Outcome, AppError> {
    const BACK_TO: &str = "/admin/pages/add";
    require_admin(&user)?;

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), BACK_TO))?;
    state
        .repo
        .create_page(input)
        .await
        .map_err(|e| slug_conflict(e, BACK_TO))?;

    Ok(Outcome::redirect("/admin/pages").with_flash(FlashMessage::success("Page added!")))
}

pub async fn edit_page_form(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let page = state.repo.get_page(id).await?;
    render(&state, ctx, View::PageForm { page: Some(page) }).await
}

pub async fn edit_page(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
    Form(form): Form<PageForm>,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    let back_to = format!("/admin/pages/{id}/edit");

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), back_to.as_str()))?;
    state
        .repo
        .update_page(id, input)
        .await
        .map_err(|e| slug_conflict(e, &back_to))?;

    Ok(Outcome::redirect("/admin/pages").with_flash(FlashMessage::success("Page updated!")))
}

pub async fn delete_page(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    require_admin(&user)?;
    state.repo.delete_page(id).await?;
    Ok(Outcome::redirect("/admin/pages").with_flash(FlashMessage::success("Page deleted.")))
}
