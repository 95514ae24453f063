use axum::extract::{Path, State};

use crate::{
    AppState,
    auth::RequestContext,
    error::AppError,
    models::RecipeFilter,
    repository::RepositoryError,
    views::View,
};

use super::{Id, Outcome, render};

/// Recipes shown on the home page.
pub const HOME_RECIPE_LIMIT: i64 = 12;
/// Sibling recipes shown under a recipe.
pub const RELATED_RECIPE_LIMIT: i64 = 4;
/// Comments shown on the testimonials page.
pub const TESTIMONIAL_LIMIT: i64 = 20;

/// index
///
/// [Public Route] The latest recipes, newest first, and every category.
pub async fn index(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    let recipes = state
        .repo
        .list_recipes(RecipeFilter::latest(HOME_RECIPE_LIMIT))
        .await?;
    let categories = state.repo.list_categories().await?;
    render(&state, ctx, View::Index { recipes, categories }).await
}

/// category
///
/// [Public Route] All recipes in one category. Unknown slugs are a 404.
pub async fn category(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Outcome, AppError> {
    let category = state.repo.get_category_by_slug(&slug).await?;
    let recipes = state
        .repo
        .list_recipes(RecipeFilter::in_category(category.id))
        .await?;
    render(&state, ctx, View::Category { category, recipes }).await
}

/// recipe_detail
///
/// [Public Route] One recipe with its comments (newest first) and a few recipes
/// from the same category.
pub async fn recipe_detail(
    ctx: RequestContext,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    let recipe = state.repo.get_recipe(id).await?;
    let comments = state.repo.list_recipe_comments(id).await?;
    let related = state
        .repo
        .related_recipes(&recipe, RELATED_RECIPE_LIMIT)
        .await?;
    render(
        &state,
        ctx,
        View::RecipeDetail {
            recipe,
            comments,
            related,
        },
    )
    .await
}

async fn static_page(
    ctx: RequestContext,
    state: AppState,
    slug: &str,
    heading: &'static str,
) -> Result<Outcome, AppError> {
    let page = match state.repo.get_page_by_slug(slug).await {
        Ok(page) => Some(page),
        Err(RepositoryError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    render(&state, ctx, View::Static { heading, page }).await
}

pub async fn about(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    static_page(ctx, state, "about", "About").await
}

pub async fn contact(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    static_page(ctx, state, "contact", "Contact").await
}

/// testimonials
///
/// [Public Route] The most recent comments across all recipes.
pub async fn testimonials(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    let comments = state.repo.list_comments(Some(TESTIMONIAL_LIMIT)).await?;
    render(&state, ctx, View::Testimonials { comments }).await
}

pub async fn health() -> &'static str {
    "ok"
}
