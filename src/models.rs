use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A registered account from the `users` table. The password is only ever held
/// as an Argon2 PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for `users`. Built only after the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Category
///
/// Groups recipes. `slug` is unique and used in `/category/{slug}` URLs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Recipe
///
/// A recipe row from `recipes`, augmented with the author's username and the
/// category name (both loaded via JOIN in the repository queries).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    // Short summary shown on cards.
    pub content: String,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    // Stored upload filename, relative to the upload directory.
    pub image: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,

    #[sqlx(default)]
    pub author_name: Option<String>,
    #[sqlx(default)]
    pub category_name: Option<String>,
    #[sqlx(default)]
    pub category_slug: Option<String>,
}

/// Comment
///
/// A comment row from `comments`, augmented with the author's username and the
/// title of the recipe it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    // 1..=5 when present.
    pub rating: Option<i32>,
    pub recipe_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,

    #[sqlx(default)]
    pub author_name: Option<String>,
    #[sqlx(default)]
    pub recipe_title: Option<String>,
}

/// Page
///
/// Admin-managed static content such as "about" or "contact".
/// `content` is trusted HTML and rendered without escaping.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
}

/// Session
///
/// Server-side login session. The cookie only carries a signed reference to `id`.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: uuid::Uuid,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

// --- Dashboard Schemas (Output) ---

/// DashboardStats
///
/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct DashboardStats {
    pub users: i64,
    pub recipes: i64,
    pub categories: i64,
    pub comments: i64,
}

/// RecipeFilter
///
/// Narrowing options for recipe listings. Results are always newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeFilter {
    pub category_id: Option<i64>,
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
}

impl RecipeFilter {
    pub fn latest(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn in_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn owned_by(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}
