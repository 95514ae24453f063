use crate::{
    auth::AuthUser,
    forms::{CategoryInput, CommentInput, PageInput, RecipeInput},
    models::{Category, Comment, DashboardStats, NewUser, Page, Recipe, RecipeFilter, Session, User},
    policy,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepositoryError
///
/// Everything a persistence call can report. `Database` is the only variant that
/// represents a fault; the others are conditions the handlers turn into a 404 or
/// a message for the user.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("slug is already in use")]
    DuplicateSlug,
    #[error("referenced record does not exist")]
    MissingReference,
    #[error("category still has recipes")]
    CategoryInUse,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The contract for all persistence operations. Handlers only ever see
/// `Arc<dyn Repository>`, so tests can swap in an in-memory implementation.
///
/// Write methods assume the caller has already applied the authorization policy.
/// Every write commits atomically or not at all.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i64) -> RepoResult<User>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    // Fails with DuplicateUsername when the exact username exists.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn toggle_admin(&self, id: i64) -> RepoResult<User>;
    // Cascades to the user's recipes, comments and sessions.
    async fn delete_user(&self, id: i64) -> RepoResult<()>;

    // --- Sessions ---
    async fn create_session(&self, user_id: i64, expires_at: DateTime<Utc>) -> RepoResult<Session>;
    // Only unexpired sessions resolve.
    async fn find_session_user(&self, session_id: Uuid) -> RepoResult<Option<User>>;
    async fn delete_session(&self, session_id: Uuid) -> RepoResult<()>;

    // --- Categories ---
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
    async fn get_category(&self, id: i64) -> RepoResult<Category>;
    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Category>;
    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category>;
    async fn update_category(&self, id: i64, input: CategoryInput) -> RepoResult<Category>;
    // Fails with CategoryInUse while any recipe references the category.
    async fn delete_category(&self, id: i64) -> RepoResult<()>;

    // --- Recipes ---
    async fn list_recipes(&self, filter: RecipeFilter) -> RepoResult<Vec<Recipe>>;
    async fn get_recipe(&self, id: i64) -> RepoResult<Recipe>;
    // Same category, excluding the recipe itself.
    async fn related_recipes(&self, recipe: &Recipe, limit: i64) -> RepoResult<Vec<Recipe>>;
    async fn create_recipe(
        &self,
        actor: &AuthUser,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe>;
    // `image: None` keeps the current image.
    async fn update_recipe(
        &self,
        id: i64,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe>;
    // Cascades to the recipe's comments.
    async fn delete_recipe(&self, id: i64) -> RepoResult<()>;

    // --- Comments ---
    async fn list_recipe_comments(&self, recipe_id: i64) -> RepoResult<Vec<Comment>>;
    async fn list_comments(&self, limit: Option<i64>) -> RepoResult<Vec<Comment>>;
    async fn create_comment(
        &self,
        actor: &AuthUser,
        recipe_id: i64,
        input: CommentInput,
    ) -> RepoResult<Comment>;
    async fn delete_comment(&self, id: i64) -> RepoResult<()>;

    // --- Pages ---
    async fn list_pages(&self) -> RepoResult<Vec<Page>>;
    async fn get_page(&self, id: i64) -> RepoResult<Page>;
    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Page>;
    async fn create_page(&self, input: PageInput) -> RepoResult<Page>;
    async fn update_page(&self, id: i64, input: PageInput) -> RepoResult<Page>;
    async fn delete_page(&self, id: i64) -> RepoResult<()>;

    // --- Dashboard ---
    async fn get_stats(&self) -> RepoResult<DashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = "id, username, password_hash, is_admin, created_at";

const RECIPE_SELECT: &str = r#"
    SELECT
        r.id, r.title, r.content, r.ingredients, r.instructions, r.image,
        r.prep_time, r.cook_time, r.servings, r.category_id, r.user_id, r.created_at,
        u.username AS author_name, c.name AS category_name, c.slug AS category_slug
    FROM recipes r
    JOIN users u ON u.id = r.user_id
    JOIN categories c ON c.id = r.category_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT
        cm.id, cm.body, cm.rating, cm.recipe_id, cm.user_id, cm.created_at,
        u.username AS author_name, r.title AS recipe_title
    FROM comments cm
    JOIN users u ON u.id = cm.user_id
    JOIN recipes r ON r.id = cm.recipe_id
"#;

/// PostgresRepository
///
/// The concrete implementation of `Repository`, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn recipe_in(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepoResult<Recipe> {
        sqlx::query_as::<_, Recipe>(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn comment_in(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE cm.id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn category_exists(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepoResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(exists)
    }

    /// True when another live row of `table` already uses `slug`.
    /// `table` is always one of our own static table names.
    async fn slug_taken(
        tx: &mut Transaction<'_, Postgres>,
        table: &'static str,
        slug: &str,
        except_id: Option<i64>,
    ) -> RepoResult<bool> {
        let taken: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = $1 AND id IS DISTINCT FROM $2)"
        ))
        .bind(slug)
        .bind(except_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(taken)
    }

    async fn delete_by_id(&self, table: &'static str, id: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Maps constraint violations raced past our explicit checks onto domain errors.
fn constraint_error(err: sqlx::Error, on_unique: RepositoryError) -> RepositoryError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => on_unique,
        Some(db) if db.is_foreign_key_violation() => RepositoryError::MissingReference,
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: i64) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Checks for an existing username inside the transaction; the UNIQUE constraint
    /// covers the race between two simultaneous registrations.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tx = self.pool.begin().await?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&user.username)
                .fetch_one(&mut *tx)
                .await?;
        if taken {
            return Err(RepositoryError::DuplicateUsername);
        }

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, is_admin) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::DuplicateUsername))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    async fn toggle_admin(&self, id: i64) -> RepoResult<User> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_admin = NOT is_admin WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> RepoResult<()> {
        self.delete_by_id("users", id).await
    }

    // --- SESSIONS ---

    async fn create_session(&self, user_id: i64, expires_at: DateTime<Utc>) -> RepoResult<Session> {
        let mut tx = self.pool.begin().await?;
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3) RETURNING id, user_id, expires_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::MissingReference))?;
        tx.commit().await?;
        Ok(session)
    }

    async fn find_session_user(&self, session_id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.is_admin, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_session(&self, session_id: Uuid) -> RepoResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> RepoResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category> {
        let mut tx = self.pool.begin().await?;
        if Self::slug_taken(&mut tx, "categories", &input.slug, None).await? {
            return Err(RepositoryError::DuplicateSlug);
        }
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3) RETURNING id, name, slug, description",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::DuplicateSlug))?;
        tx.commit().await?;
        Ok(category)
    }

    async fn update_category(&self, id: i64, input: CategoryInput) -> RepoResult<Category> {
        let mut tx = self.pool.begin().await?;
        if Self::slug_taken(&mut tx, "categories", &input.slug, Some(id)).await? {
            return Err(RepositoryError::DuplicateSlug);
        }
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, slug = $3, description = $4 WHERE id = $1 RETURNING id, name, slug, description",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::DuplicateSlug))?
        .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(category)
    }

    /// delete_category
    ///
    /// Locks the category row, counts referencing recipes and refuses while any remain.
    /// The RESTRICT foreign key catches a recipe inserted concurrently.
    async fn delete_category(&self, id: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let recipe_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        policy::category_deletable(recipe_count).map_err(|_| RepositoryError::CategoryInUse)?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match constraint_error(e, RepositoryError::CategoryInUse) {
                RepositoryError::MissingReference => RepositoryError::CategoryInUse,
                other => other,
            })?;

        tx.commit().await?;
        Ok(())
    }

    // --- RECIPES ---

    /// list_recipes
    ///
    /// Newest first. QueryBuilder keeps every filter value parameterized.
    async fn list_recipes(&self, filter: RecipeFilter) -> RepoResult<Vec<Recipe>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(RECIPE_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(category_id) = filter.category_id {
            builder.push(" AND r.category_id = ").push_bind(category_id);
        }
        if let Some(user_id) = filter.user_id {
            builder.push(" AND r.user_id = ").push_bind(user_id);
        }

        builder.push(" ORDER BY r.created_at DESC, r.id DESC");

        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let recipes = builder
            .build_query_as::<Recipe>()
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn get_recipe(&self, id: i64) -> RepoResult<Recipe> {
        sqlx::query_as::<_, Recipe>(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn related_recipes(&self, recipe: &Recipe, limit: i64) -> RepoResult<Vec<Recipe>> {
        let related = sqlx::query_as::<_, Recipe>(&format!(
            "{RECIPE_SELECT} WHERE r.category_id = $1 AND r.id <> $2 ORDER BY r.id LIMIT $3"
        ))
        .bind(recipe.category_id)
        .bind(recipe.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(related)
    }

    async fn create_recipe(
        &self,
        actor: &AuthUser,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe> {
        let mut tx = self.pool.begin().await?;

        if !Self::category_exists(&mut tx, input.category_id).await? {
            return Err(RepositoryError::MissingReference);
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes
                (title, content, ingredients, instructions, image,
                 prep_time, cook_time, servings, category_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.ingredients)
        .bind(&input.instructions)
        .bind(&image)
        .bind(input.prep_time)
        .bind(input.cook_time)
        .bind(input.servings)
        .bind(input.category_id)
        .bind(actor.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::MissingReference))?;

        let recipe = Self::recipe_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    /// update_recipe
    ///
    /// Replaces every editable field. `created_at` and the owner never change;
    /// the image is only replaced when a new one was accepted (COALESCE).
    async fn update_recipe(
        &self,
        id: i64,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM recipes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if !Self::category_exists(&mut tx, input.category_id).await? {
            return Err(RepositoryError::MissingReference);
        }

        sqlx::query(
            r#"
            UPDATE recipes
            SET title = $2,
                content = $3,
                ingredients = $4,
                instructions = $5,
                category_id = $6,
                prep_time = $7,
                cook_time = $8,
                servings = $9,
                image = COALESCE($10, image)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.ingredients)
        .bind(&input.instructions)
        .bind(input.category_id)
        .bind(input.prep_time)
        .bind(input.cook_time)
        .bind(input.servings)
        .bind(&image)
        .execute(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::MissingReference))?;

        let recipe = Self::recipe_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: i64) -> RepoResult<()> {
        self.delete_by_id("recipes", id).await
    }

    // --- COMMENTS ---

    async fn list_recipe_comments(&self, recipe_id: i64) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE cm.recipe_id = $1 ORDER BY cm.created_at DESC, cm.id DESC"
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn list_comments(&self, limit: Option<i64>) -> RepoResult<Vec<Comment>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(COMMENT_SELECT);
        builder.push(" ORDER BY cm.created_at DESC, cm.id DESC");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        let comments = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn create_comment(
        &self,
        actor: &AuthUser,
        recipe_id: i64,
        input: CommentInput,
    ) -> RepoResult<Comment> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (body, rating, recipe_id, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&input.body)
        .bind(input.rating)
        .bind(recipe_id)
        .bind(actor.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match constraint_error(e, RepositoryError::MissingReference) {
            // The recipe vanished between the handler's lookup and this insert.
            RepositoryError::MissingReference => RepositoryError::NotFound,
            other => other,
        })?;

        let comment = Self::comment_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<()> {
        self.delete_by_id("comments", id).await
    }

    // --- PAGES ---

    async fn list_pages(&self) -> RepoResult<Vec<Page>> {
        let pages =
            sqlx::query_as::<_, Page>("SELECT id, slug, title, content FROM pages ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(pages)
    }

    async fn get_page(&self, id: i64) -> RepoResult<Page> {
        sqlx::query_as::<_, Page>("SELECT id, slug, title, content FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Page> {
        sqlx::query_as::<_, Page>("SELECT id, slug, title, content FROM pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_page(&self, input: PageInput) -> RepoResult<Page> {
        let mut tx = self.pool.begin().await?;
        if Self::slug_taken(&mut tx, "pages", &input.slug, None).await? {
            return Err(RepositoryError::DuplicateSlug);
        }
        let page = sqlx::query_as::<_, Page>(
            "INSERT INTO pages (slug, title, content) VALUES ($1, $2, $3) RETURNING id, slug, title, content",
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::DuplicateSlug))?;
        tx.commit().await?;
        Ok(page)
    }

    async fn update_page(&self, id: i64, input: PageInput) -> RepoResult<Page> {
        let mut tx = self.pool.begin().await?;
        if Self::slug_taken(&mut tx, "pages", &input.slug, Some(id)).await? {
            return Err(RepositoryError::DuplicateSlug);
        }
        let page = sqlx::query_as::<_, Page>(
            "UPDATE pages SET slug = $2, title = $3, content = $4 WHERE id = $1 RETURNING id, slug, title, content",
        )
        .bind(id)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.content)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, RepositoryError::DuplicateSlug))?
        .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(page)
    }

    async fn delete_page(&self, id: i64) -> RepoResult<()> {
        self.delete_by_id("pages", id).await
    }

    // --- DASHBOARD ---

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM recipes) AS recipes,
                (SELECT COUNT(*) FROM categories) AS categories,
                (SELECT COUNT(*) FROM comments) AS comments
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
