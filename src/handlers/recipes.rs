use axum::{
    Form,
    extract::{Multipart, State},
};

use crate::{
    AppState,
    auth::{AuthUser, RequestContext},
    error::AppError,
    flash::FlashMessage,
    forms::{CommentForm, RecipeForm, RecipeInput},
    models::RecipeFilter,
    policy,
    repository::RepositoryError,
    uploads::{self, IncomingFile},
    views::View,
};

use super::{Id, Outcome, deny, render};

const UNKNOWN_CATEGORY: &str = "Please choose an existing category.";

/// Splits a multipart recipe submission into its text fields and the optional
/// `image` part. The body size cap has already been applied by the transport layer.
async fn read_recipe_form(
    mut multipart: Multipart,
) -> Result<(RecipeForm, Option<IncomingFile>), AppError> {
    let mut form = RecipeForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "image" {
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await?;
            image = Some(IncomingFile { file_name, data });
        } else {
            let value = field.text().await?;
            form.set(&name, value);
        }
    }

    Ok((form, image))
}

/// Validates the form and confirms the chosen category exists, so nothing is written
/// to disk for a submission that is going to be rejected.
async fn validated_input(
    state: &AppState,
    form: RecipeForm,
    back_to: &str,
) -> Result<RecipeInput, AppError> {
    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), back_to))?;

    match state.repo.get_category(input.category_id).await {
        Ok(_) => Ok(input),
        Err(RepositoryError::NotFound) => Err(AppError::invalid(UNKNOWN_CATEGORY, back_to)),
        Err(e) => Err(e.into()),
    }
}

fn category_vanished(err: RepositoryError, back_to: &str) -> AppError {
    match err {
        RepositoryError::MissingReference => AppError::invalid(UNKNOWN_CATEGORY, back_to),
        other => other.into(),
    }
}

/// add_comment
///
/// [Authenticated Route] Posts a comment with an optional 1-5 rating, then returns
/// to the recipe either way.
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Id(recipe_id): Id,
    Form(form): Form<CommentForm>,
) -> Result<Outcome, AppError> {
    let recipe = state.repo.get_recipe(recipe_id).await?;
    let back_to = format!("/recipe/{}", recipe.id);

    let input = form
        .parse()
        .map_err(|e| AppError::invalid(e.to_string(), back_to.as_str()))?;

    let comment = state.repo.create_comment(&user, recipe.id, input).await?;
    tracing::info!(comment_id = comment.id, recipe_id = recipe.id, user_id = user.id, "comment added");

    Ok(Outcome::redirect(back_to).with_flash(FlashMessage::success("Your comment was added.")))
}

/// my_recipes
///
/// [Authenticated Route] Every recipe owned by the caller.
pub async fn my_recipes(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    let recipes = state
        .repo
        .list_recipes(RecipeFilter::owned_by(user.id))
        .await?;
    render(&state, ctx, View::MyRecipes { recipes }).await
}

pub async fn add_recipe_form(
    _user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Outcome, AppError> {
    let categories = state.repo.list_categories().await?;
    render(
        &state,
        ctx,
        View::RecipeForm {
            recipe: None,
            categories,
        },
    )
    .await
}

/// add_recipe
///
/// [Authenticated Route] Creates a recipe owned by the caller. An image part is
/// optional; files with a non-whitelisted extension are ignored rather than rejected.
pub async fn add_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Outcome, AppError> {
    const BACK_TO: &str = "/recipe/add";

    let (form, file) = read_recipe_form(multipart).await?;
    let input = validated_input(&state, form, BACK_TO).await?;

    let image = uploads::accept_upload(
        state.storage.as_ref(),
        &state.config.allowed_extensions,
        file,
    )
    .await?;

    let recipe = match state.repo.create_recipe(&user, input, image.clone()).await {
        Ok(recipe) => recipe,
        Err(e) => {
            uploads::discard_upload(state.storage.as_ref(), image.as_deref()).await;
            return Err(category_vanished(e, BACK_TO));
        }
    };
    tracing::info!(recipe_id = recipe.id, user_id = user.id, "recipe created");

    Ok(Outcome::redirect(format!("/recipe/{}", recipe.id))
        .with_flash(FlashMessage::success("Recipe added!")))
}

/// edit_recipe_form
///
/// [Authenticated Route] Owner or admin only.
pub async fn edit_recipe_form(
    user: AuthUser,
    ctx: RequestContext,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    let recipe = state.repo.get_recipe(id).await?;
    policy::require_owner_or_admin(&user, recipe.user_id)
        .map_err(|d| deny(d, format!("/recipe/{id}")))?;

    let categories = state.repo.list_categories().await?;
    render(
        &state,
        ctx,
        View::RecipeForm {
            recipe: Some(recipe),
            categories,
        },
    )
    .await
}

/// edit_recipe
///
/// [Authenticated Route] Owner or admin only. Same validation as creation; the
/// stored image is kept unless a new acceptable file arrives.
pub async fn edit_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
    multipart: Multipart,
) -> Result<Outcome, AppError> {
    let recipe = state.repo.get_recipe(id).await?;
    policy::require_owner_or_admin(&user, recipe.user_id)
        .map_err(|d| deny(d, format!("/recipe/{id}")))?;

    let back_to = format!("/recipe/{id}/edit");
    let (form, file) = read_recipe_form(multipart).await?;
    let input = validated_input(&state, form, &back_to).await?;

    let image = uploads::accept_upload(
        state.storage.as_ref(),
        &state.config.allowed_extensions,
        file,
    )
    .await?;

    if let Err(e) = state.repo.update_recipe(id, input, image.clone()).await {
        uploads::discard_upload(state.storage.as_ref(), image.as_deref()).await;
        return Err(category_vanished(e, &back_to));
    }
    tracing::info!(recipe_id = id, user_id = user.id, "recipe updated");

    Ok(Outcome::redirect(format!("/recipe/{id}"))
        .with_flash(FlashMessage::success("Recipe updated!")))
}

/// delete_recipe
///
/// [Authenticated Route] Owner or admin only. Comments go with the recipe; the
/// image file stays in the upload directory.
pub async fn delete_recipe(
    user: AuthUser,
    State(state): State<AppState>,
    Id(id): Id,
) -> Result<Outcome, AppError> {
    let recipe = state.repo.get_recipe(id).await?;
    policy::require_owner_or_admin(&user, recipe.user_id)
        .map_err(|d| deny(d, format!("/recipe/{id}")))?;

    state.repo.delete_recipe(id).await?;
    tracing::info!(recipe_id = id, user_id = user.id, "recipe deleted");

    Ok(Outcome::redirect("/my-recipes").with_flash(FlashMessage::info("Recipe deleted.")))
}
