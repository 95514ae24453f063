//! Form payloads and their validated counterparts.
//!
//! Each `*Form` mirrors the raw fields a browser submits (every field optional,
//! defaulting to empty). `parse` turns it into the `*Input` the repository accepts,
//! or a `ValidationError` whose message is shown to the user.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username and password are required.")]
    MissingCredentials,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Title, summary and category are required.")]
    MissingRecipeFields,
    #[error("{0} must be a whole number of zero or more.")]
    InvalidNumber(&'static str),
    #[error("Comment cannot be empty.")]
    EmptyComment,
    #[error("Rating must be between 1 and 5.")]
    InvalidRating,
    #[error("Name and slug are required.")]
    MissingCategoryFields,
    #[error("Slug and title are required.")]
    MissingPageFields,
    #[error("Slug may only contain letters, digits, '-' and '_'.")]
    InvalidSlug,
}

// --- Accounts ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// A registration request that passed field validation. Username uniqueness is
/// checked by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInput {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn parse(self) -> Result<RegistrationInput, ValidationError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(RegistrationInput {
            username: self.username,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

// --- Recipes ---

#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    pub title: String,
    pub content: String,
    pub ingredients: String,
    pub instructions: String,
    pub category_id: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
}

/// Validated recipe fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeInput {
    pub title: String,
    pub content: String,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub category_id: i64,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
}

impl RecipeForm {
    /// Assigns a multipart text field by name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "content" => &mut self.content,
            "ingredients" => &mut self.ingredients,
            "instructions" => &mut self.instructions,
            "category_id" => &mut self.category_id,
            "prep_time" => &mut self.prep_time,
            "cook_time" => &mut self.cook_time,
            "servings" => &mut self.servings,
            _ => return,
        };
        *slot = value;
    }

    pub fn parse(self) -> Result<RecipeInput, ValidationError> {
        let title = self.title.trim();
        let content = self.content.trim();
        let category_id = self.category_id.trim().parse::<i64>().ok();

        let (Some(category_id), false, false) = (category_id, title.is_empty(), content.is_empty())
        else {
            return Err(ValidationError::MissingRecipeFields);
        };

        Ok(RecipeInput {
            title: title.to_string(),
            content: content.to_string(),
            ingredients: non_blank(self.ingredients),
            instructions: non_blank(self.instructions),
            category_id,
            prep_time: optional_count(&self.prep_time, "Preparation time")?,
            cook_time: optional_count(&self.cook_time, "Cooking time")?,
            servings: optional_count(&self.servings, "Servings")?,
        })
    }
}

// --- Comments ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInput {
    pub body: String,
    pub rating: Option<i32>,
}

impl CommentForm {
    pub fn parse(self) -> Result<CommentInput, ValidationError> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyComment);
        }

        let rating = match self.rating.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(value @ 1..=5) => Some(value),
                _ => return Err(ValidationError::InvalidRating),
            },
        };

        Ok(CommentInput {
            body: body.to_string(),
            rating,
        })
    }
}

// --- Categories & Pages ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl CategoryForm {
    pub fn parse(self) -> Result<CategoryInput, ValidationError> {
        let name = self.name.trim();
        let slug = self.slug.trim();
        if name.is_empty() || slug.is_empty() {
            return Err(ValidationError::MissingCategoryFields);
        }
        Ok(CategoryInput {
            name: name.to_string(),
            slug: checked_slug(slug)?,
            description: non_blank(self.description),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInput {
    pub slug: String,
    pub title: String,
    pub content: String,
}

impl PageForm {
    pub fn parse(self) -> Result<PageInput, ValidationError> {
        let slug = self.slug.trim();
        let title = self.title.trim();
        if slug.is_empty() || title.is_empty() {
            return Err(ValidationError::MissingPageFields);
        }
        Ok(PageInput {
            slug: checked_slug(slug)?,
            title: title.to_string(),
            content: self.content,
        })
    }
}

// --- Field helpers ---

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Empty means "not given"; anything else must be a non-negative integer.
fn optional_count(raw: &str, field: &'static str) -> Result<Option<i32>, ValidationError> {
    match raw.trim() {
        "" => Ok(None),
        value => match value.parse::<i32>() {
            Ok(n) if n >= 0 => Ok(Some(n)),
            _ => Err(ValidationError::InvalidNumber(field)),
        },
    }
}

fn checked_slug(slug: &str) -> Result<String, ValidationError> {
    if slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(slug.to_string())
    } else {
        Err(ValidationError::InvalidSlug)
    }
}
