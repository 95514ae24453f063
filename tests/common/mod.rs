#![allow(dead_code)]

use argon2::Params;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use recipe_portal::{
    AppConfig, AppState, Credentials, MockStorageService,
    auth::{self, AuthUser},
    forms::{CategoryInput, CommentInput, PageInput, RecipeInput},
    models::{
        Category, Comment, DashboardStats, NewUser, Page, Recipe, RecipeFilter, Session, User,
    },
    repository::{RepoResult, Repository, RepositoryError, RepositoryState},
    storage::StorageState,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use uuid::Uuid;

// --- IN-MEMORY REPOSITORY ---

#[derive(Default)]
struct Store {
    next_id: i64,
    // Monotonic clock so "newest first" is deterministic within a test.
    ticks: i64,
    users: Vec<User>,
    sessions: Vec<Session>,
    categories: Vec<Category>,
    recipes: Vec<Recipe>,
    comments: Vec<Comment>,
    pages: Vec<Page>,
}

impl Store {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000) + Duration::seconds(self.ticks)
    }

    fn decorate_recipe(&self, recipe: &Recipe) -> Recipe {
        let mut recipe = recipe.clone();
        recipe.author_name = self
            .users
            .iter()
            .find(|u| u.id == recipe.user_id)
            .map(|u| u.username.clone());
        let category = self.categories.iter().find(|c| c.id == recipe.category_id);
        recipe.category_name = category.map(|c| c.name.clone());
        recipe.category_slug = category.map(|c| c.slug.clone());
        recipe
    }

    fn decorate_comment(&self, comment: &Comment) -> Comment {
        let mut comment = comment.clone();
        comment.author_name = self
            .users
            .iter()
            .find(|u| u.id == comment.user_id)
            .map(|u| u.username.clone());
        comment.recipe_title = self
            .recipes
            .iter()
            .find(|r| r.id == comment.recipe_id)
            .map(|r| r.title.clone());
        comment
    }

    fn slug_taken_by_category(&self, slug: &str, except: Option<i64>) -> bool {
        self.categories
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn slug_taken_by_page(&self, slug: &str, except: Option<i64>) -> bool {
        self.pages
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }
}

/// MemoryRepository
///
/// A complete in-memory `Repository` with the same ordering, uniqueness and cascade
/// rules as the Postgres implementation. `fail_all` turns every call into a
/// database fault; `fail_recipe_writes` only faults recipe inserts and updates.
#[derive(Default)]
pub struct MemoryRepository {
    store: Mutex<Store>,
    fail_all: AtomicBool,
    fail_recipe_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    pub fn set_recipe_writes_failing(&self, failing: bool) {
        self.fail_recipe_writes.store(failing, Ordering::SeqCst);
    }

    fn recipe_write_lock(&self) -> RepoResult<std::sync::MutexGuard<'_, Store>> {
        if self.fail_recipe_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.lock()
    }

    fn lock(&self) -> RepoResult<std::sync::MutexGuard<'_, Store>> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.store.lock().expect("store lock poisoned"))
    }

    // --- Seeding helpers (bypass validation) ---

    pub fn seed_user(&self, username: &str, is_admin: bool) -> AuthUser {
        self.seed_user_with_hash(username, "not-a-phc-string", is_admin)
    }

    pub fn seed_user_with_hash(&self, username: &str, hash: &str, is_admin: bool) -> AuthUser {
        let mut store = self.store.lock().expect("store lock poisoned");
        let id = store.id();
        let created_at = store.now();
        let user = User {
            id,
            username: username.to_string(),
            password_hash: hash.to_string(),
            is_admin,
            created_at,
        };
        store.users.push(user.clone());
        user.into()
    }

    pub fn seed_category(&self, name: &str, slug: &str) -> Category {
        let mut store = self.store.lock().expect("store lock poisoned");
        let category = Category {
            id: store.id(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
        };
        store.categories.push(category.clone());
        category
    }

    pub fn seed_recipe(&self, owner: &AuthUser, category: &Category, title: &str) -> Recipe {
        let mut store = self.store.lock().expect("store lock poisoned");
        let recipe = Recipe {
            id: store.id(),
            title: title.to_string(),
            content: format!("{title} summary"),
            category_id: category.id,
            user_id: owner.id,
            created_at: store.now(),
            ..Recipe::default()
        };
        store.recipes.push(recipe.clone());
        store.decorate_recipe(&recipe)
    }

    pub fn seed_comment(&self, author: &AuthUser, recipe: &Recipe, body: &str) -> Comment {
        let mut store = self.store.lock().expect("store lock poisoned");
        let comment = Comment {
            id: store.id(),
            body: body.to_string(),
            rating: None,
            recipe_id: recipe.id,
            user_id: author.id,
            created_at: store.now(),
            ..Comment::default()
        };
        store.comments.push(comment.clone());
        store.decorate_comment(&comment)
    }

    pub fn seed_page(&self, slug: &str, title: &str, content: &str) -> Page {
        let mut store = self.store.lock().expect("store lock poisoned");
        let page = Page {
            id: store.id(),
            slug: slug.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        };
        store.pages.push(page.clone());
        page
    }

    // --- Inspection helpers ---

    pub fn recipe_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").recipes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").comments.len()
    }

    pub fn session_count(&self) -> usize {
        self.store.lock().expect("store lock poisoned").sessions.len()
    }

    pub fn user_named(&self, username: &str) -> Option<User> {
        self.store
            .lock()
            .expect("store lock poisoned")
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn recipe(&self, id: i64) -> Option<Recipe> {
        let store = self.store.lock().expect("store lock poisoned");
        store
            .recipes
            .iter()
            .find(|r| r.id == id)
            .map(|r| store.decorate_recipe(r))
    }

    pub fn latest_recipe(&self) -> Option<Recipe> {
        let store = self.store.lock().expect("store lock poisoned");
        store
            .recipes
            .iter()
            .max_by_key(|r| r.id)
            .map(|r| store.decorate_recipe(r))
    }

    pub fn category(&self, id: i64) -> Option<Category> {
        self.store
            .lock()
            .expect("store lock poisoned")
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.store
            .lock()
            .expect("store lock poisoned")
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (DateTime<Utc>, i64),
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: i64) -> RepoResult<User> {
        let store = self.lock()?;
        store
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let store = self.lock()?;
        Ok(store.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut store = self.lock()?;
        if store.users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::DuplicateUsername);
        }
        let created = User {
            id: store.id(),
            username: user.username,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: store.now(),
        };
        store.users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let store = self.lock()?;
        let mut users = store.users.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn toggle_admin(&self, id: i64) -> RepoResult<User> {
        let mut store = self.lock()?;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.is_admin = !user.is_admin;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> RepoResult<()> {
        let mut store = self.lock()?;
        if !store.users.iter().any(|u| u.id == id) {
            return Err(RepositoryError::NotFound);
        }
        let owned: Vec<i64> = store
            .recipes
            .iter()
            .filter(|r| r.user_id == id)
            .map(|r| r.id)
            .collect();
        store.users.retain(|u| u.id != id);
        store.sessions.retain(|s| s.user_id != id);
        store.recipes.retain(|r| r.user_id != id);
        store
            .comments
            .retain(|c| c.user_id != id && !owned.contains(&c.recipe_id));
        Ok(())
    }

    async fn create_session(&self, user_id: i64, expires_at: DateTime<Utc>) -> RepoResult<Session> {
        let mut store = self.lock()?;
        if !store.users.iter().any(|u| u.id == user_id) {
            return Err(RepositoryError::MissingReference);
        }
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            expires_at,
        };
        store.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session_user(&self, session_id: Uuid) -> RepoResult<Option<User>> {
        let store = self.lock()?;
        let now = Utc::now();
        Ok(store
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.expires_at > now)
            .and_then(|s| store.users.iter().find(|u| u.id == s.user_id))
            .cloned())
    }

    async fn delete_session(&self, session_id: Uuid) -> RepoResult<()> {
        let mut store = self.lock()?;
        store.sessions.retain(|s| s.id != session_id);
        Ok(())
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let store = self.lock()?;
        let mut categories = store.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> RepoResult<Category> {
        let store = self.lock()?;
        store
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_category_by_slug(&self, slug: &str) -> RepoResult<Category> {
        let store = self.lock()?;
        store
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_category(&self, input: CategoryInput) -> RepoResult<Category> {
        let mut store = self.lock()?;
        if store.slug_taken_by_category(&input.slug, None) {
            return Err(RepositoryError::DuplicateSlug);
        }
        let category = Category {
            id: store.id(),
            name: input.name,
            slug: input.slug,
            description: input.description,
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, input: CategoryInput) -> RepoResult<Category> {
        let mut store = self.lock()?;
        if !store.categories.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if store.slug_taken_by_category(&input.slug, Some(id)) {
            return Err(RepositoryError::DuplicateSlug);
        }
        let category = store
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        category.name = input.name;
        category.slug = input.slug;
        category.description = input.description;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> RepoResult<()> {
        let mut store = self.lock()?;
        if !store.categories.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if store.recipes.iter().any(|r| r.category_id == id) {
            return Err(RepositoryError::CategoryInUse);
        }
        store.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> RepoResult<Vec<Recipe>> {
        let store = self.lock()?;
        let mut recipes: Vec<Recipe> = store
            .recipes
            .iter()
            .filter(|r| filter.category_id.is_none_or(|id| r.category_id == id))
            .filter(|r| filter.user_id.is_none_or(|id| r.user_id == id))
            .map(|r| store.decorate_recipe(r))
            .collect();
        newest_first(&mut recipes, |r| (r.created_at, r.id));
        if let Some(limit) = filter.limit {
            recipes.truncate(limit.max(0) as usize);
        }
        Ok(recipes)
    }

    async fn get_recipe(&self, id: i64) -> RepoResult<Recipe> {
        let store = self.lock()?;
        store
            .recipes
            .iter()
            .find(|r| r.id == id)
            .map(|r| store.decorate_recipe(r))
            .ok_or(RepositoryError::NotFound)
    }

    async fn related_recipes(&self, recipe: &Recipe, limit: i64) -> RepoResult<Vec<Recipe>> {
        let store = self.lock()?;
        let mut related: Vec<Recipe> = store
            .recipes
            .iter()
            .filter(|r| r.category_id == recipe.category_id && r.id != recipe.id)
            .map(|r| store.decorate_recipe(r))
            .collect();
        related.sort_by_key(|r| r.id);
        related.truncate(limit.max(0) as usize);
        Ok(related)
    }

    async fn create_recipe(
        &self,
        actor: &AuthUser,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe> {
        let mut store = self.recipe_write_lock()?;
        if !store.categories.iter().any(|c| c.id == input.category_id) {
            return Err(RepositoryError::MissingReference);
        }
        let recipe = Recipe {
            id: store.id(),
            title: input.title,
            content: input.content,
            ingredients: input.ingredients,
            instructions: input.instructions,
            image,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            category_id: input.category_id,
            user_id: actor.id,
            created_at: store.now(),
            author_name: None,
            category_name: None,
            category_slug: None,
        };
        store.recipes.push(recipe.clone());
        Ok(store.decorate_recipe(&recipe))
    }

    async fn update_recipe(
        &self,
        id: i64,
        input: RecipeInput,
        image: Option<String>,
    ) -> RepoResult<Recipe> {
        let mut store = self.recipe_write_lock()?;
        if !store.recipes.iter().any(|r| r.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if !store.categories.iter().any(|c| c.id == input.category_id) {
            return Err(RepositoryError::MissingReference);
        }
        let recipe = store
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        recipe.title = input.title;
        recipe.content = input.content;
        recipe.ingredients = input.ingredients;
        recipe.instructions = input.instructions;
        recipe.category_id = input.category_id;
        recipe.prep_time = input.prep_time;
        recipe.cook_time = input.cook_time;
        recipe.servings = input.servings;
        if image.is_some() {
            recipe.image = image;
        }
        let updated = recipe.clone();
        Ok(store.decorate_recipe(&updated))
    }

    async fn delete_recipe(&self, id: i64) -> RepoResult<()> {
        let mut store = self.lock()?;
        if !store.recipes.iter().any(|r| r.id == id) {
            return Err(RepositoryError::NotFound);
        }
        store.recipes.retain(|r| r.id != id);
        store.comments.retain(|c| c.recipe_id != id);
        Ok(())
    }

    async fn list_recipe_comments(&self, recipe_id: i64) -> RepoResult<Vec<Comment>> {
        let store = self.lock()?;
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .map(|c| store.decorate_comment(c))
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn list_comments(&self, limit: Option<i64>) -> RepoResult<Vec<Comment>> {
        let store = self.lock()?;
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .map(|c| store.decorate_comment(c))
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        if let Some(limit) = limit {
            comments.truncate(limit.max(0) as usize);
        }
        Ok(comments)
    }

    async fn create_comment(
        &self,
        actor: &AuthUser,
        recipe_id: i64,
        input: CommentInput,
    ) -> RepoResult<Comment> {
        let mut store = self.lock()?;
        if !store.recipes.iter().any(|r| r.id == recipe_id) {
            return Err(RepositoryError::NotFound);
        }
        let comment = Comment {
            id: store.id(),
            body: input.body,
            rating: input.rating,
            recipe_id,
            user_id: actor.id,
            created_at: store.now(),
            author_name: None,
            recipe_title: None,
        };
        store.comments.push(comment.clone());
        Ok(store.decorate_comment(&comment))
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<()> {
        let mut store = self.lock()?;
        if !store.comments.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }
        store.comments.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_pages(&self) -> RepoResult<Vec<Page>> {
        let store = self.lock()?;
        let mut pages = store.pages.clone();
        pages.sort_by_key(|p| p.id);
        Ok(pages)
    }

    async fn get_page(&self, id: i64) -> RepoResult<Page> {
        let store = self.lock()?;
        store
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_page_by_slug(&self, slug: &str) -> RepoResult<Page> {
        let store = self.lock()?;
        store
            .pages
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_page(&self, input: PageInput) -> RepoResult<Page> {
        let mut store = self.lock()?;
        if store.slug_taken_by_page(&input.slug, None) {
            return Err(RepositoryError::DuplicateSlug);
        }
        let page = Page {
            id: store.id(),
            slug: input.slug,
            title: input.title,
            content: input.content,
        };
        store.pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(&self, id: i64, input: PageInput) -> RepoResult<Page> {
        let mut store = self.lock()?;
        if !store.pages.iter().any(|p| p.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if store.slug_taken_by_page(&input.slug, Some(id)) {
            return Err(RepositoryError::DuplicateSlug);
        }
        let page = store
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        page.slug = input.slug;
        page.title = input.title;
        page.content = input.content;
        Ok(page.clone())
    }

    async fn delete_page(&self, id: i64) -> RepoResult<()> {
        let mut store = self.lock()?;
        if !store.pages.iter().any(|p| p.id == id) {
            return Err(RepositoryError::NotFound);
        }
        store.pages.retain(|p| p.id != id);
        Ok(())
    }

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        let store = self.lock()?;
        Ok(DashboardStats {
            users: store.users.len() as i64,
            recipes: store.recipes.len() as i64,
            categories: store.categories.len() as i64,
            comments: store.comments.len() as i64,
        })
    }
}

// --- STATE BUILDERS ---

/// Argon2id at its minimum cost so tests stay fast.
pub fn cheap_credentials() -> Credentials {
    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .expect("minimum argon2 params are valid");
    Credentials::with_params(params)
}

pub fn test_state(repo: Arc<MemoryRepository>, storage: MockStorageService) -> AppState {
    AppState {
        repo: repo as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        credentials: cheap_credentials(),
        config: AppConfig::default(),
    }
}

/// Opens a session for `user` and returns the `Cookie` header value carrying it.
pub async fn session_cookie_for(state: &AppState, user: &AuthUser) -> String {
    let session = state
        .repo
        .create_session(user.id, Utc::now() + Duration::hours(1))
        .await
        .expect("session created");
    let token = auth::issue_session_token(&state.config.secret_key, &session)
        .expect("session token signed");
    format!("{}={}", auth::SESSION_COOKIE, token)
}
