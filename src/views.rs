//! Server-side rendering.
//!
//! `render` is a pure function from a `Page` view-model to an HTML document.
//! Every user-supplied string goes through `escape`; only `Page.content`, which is
//! admin-authored trusted HTML, is emitted as-is.

use axum::http::StatusCode;

use crate::{
    auth::{Actor, AuthUser},
    flash::FlashMessage,
    models::{Category, Comment, DashboardStats, Page as StaticPage, Recipe, User},
    policy,
};

/// Site-wide context shown around every view.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub actor: Actor,
    pub flash: Option<FlashMessage>,
    /// Navigation categories, present on every page.
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub view: View,
    pub chrome: Chrome,
}

#[derive(Debug, Clone)]
pub enum View {
    Index {
        recipes: Vec<Recipe>,
        categories: Vec<Category>,
    },
    Category {
        category: Category,
        recipes: Vec<Recipe>,
    },
    RecipeDetail {
        recipe: Recipe,
        comments: Vec<Comment>,
        related: Vec<Recipe>,
    },
    /// `/about` and `/contact`; `page` is `None` until an admin creates it.
    Static {
        heading: &'static str,
        page: Option<StaticPage>,
    },
    Testimonials {
        comments: Vec<Comment>,
    },
    Register,
    Login {
        next: Option<String>,
    },
    MyRecipes {
        recipes: Vec<Recipe>,
    },
    /// Add form when `recipe` is `None`, edit form otherwise.
    RecipeForm {
        recipe: Option<Recipe>,
        categories: Vec<Category>,
    },
    AdminDashboard {
        stats: DashboardStats,
    },
    AdminRecipes {
        recipes: Vec<Recipe>,
    },
    AdminCategories {
        categories: Vec<Category>,
    },
    CategoryForm {
        category: Option<Category>,
    },
    AdminUsers {
        users: Vec<User>,
    },
    AdminComments {
        comments: Vec<Comment>,
    },
    AdminPages {
        pages: Vec<StaticPage>,
    },
    PageForm {
        page: Option<StaticPage>,
    },
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::Index { .. } => "Latest recipes".to_string(),
            View::Category { category, .. } => category.name.clone(),
            View::RecipeDetail { recipe, .. } => recipe.title.clone(),
            View::Static { heading, page } => page
                .as_ref()
                .map(|p| p.title.clone())
                .unwrap_or_else(|| heading.to_string()),
            View::Testimonials { .. } => "Testimonials".to_string(),
            View::Register => "Register".to_string(),
            View::Login { .. } => "Log in".to_string(),
            View::MyRecipes { .. } => "My recipes".to_string(),
            View::RecipeForm { recipe: None, .. } => "Add recipe".to_string(),
            View::RecipeForm { recipe: Some(_), .. } => "Edit recipe".to_string(),
            View::AdminDashboard { .. } => "Admin".to_string(),
            View::AdminRecipes { .. } => "Admin · Recipes".to_string(),
            View::AdminCategories { .. } => "Admin · Categories".to_string(),
            View::CategoryForm { category: None } => "Add category".to_string(),
            View::CategoryForm { category: Some(_) } => "Edit category".to_string(),
            View::AdminUsers { .. } => "Admin · Users".to_string(),
            View::AdminComments { .. } => "Admin · Comments".to_string(),
            View::AdminPages { .. } => "Admin · Pages".to_string(),
            View::PageForm { page: None } => "Add page".to_string(),
            View::PageForm { page: Some(_) } => "Edit page".to_string(),
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(page: &Page) -> String {
    let body = match &page.view {
        View::Index {
            recipes,
            categories,
        } => index(recipes, categories),
        View::Category { category, recipes } => category_view(category, recipes),
        View::RecipeDetail {
            recipe,
            comments,
            related,
        } => recipe_detail(recipe, comments, related, page.chrome.actor.user()),
        View::Static { heading, page } => static_page(heading, page.as_ref()),
        View::Testimonials { comments } => testimonials(comments),
        View::Register => register(),
        View::Login { next } => login(next.as_deref()),
        View::MyRecipes { recipes } => my_recipes(recipes),
        View::RecipeForm { recipe, categories } => recipe_form(recipe.as_ref(), categories),
        View::AdminDashboard { stats } => admin_dashboard(stats),
        View::AdminRecipes { recipes } => admin_recipes(recipes),
        View::AdminCategories { categories } => admin_categories(categories),
        View::CategoryForm { category } => category_form(category.as_ref()),
        View::AdminUsers { users } => admin_users(users, page.chrome.actor.user()),
        View::AdminComments { comments } => admin_comments(comments),
        View::AdminPages { pages } => admin_pages(pages),
        View::PageForm { page } => page_form(page.as_ref()),
    };
    layout(&page.view.title(), &page.chrome, &body)
}

pub fn error_page(status: StatusCode) -> String {
    let (heading, text) = match status {
        StatusCode::NOT_FOUND => ("Page not found", "The page you are looking for does not exist."),
        StatusCode::PAYLOAD_TOO_LARGE => ("Upload too large", "The submitted file exceeds the size limit."),
        s if s.is_client_error() => ("Bad request", "The request could not be processed."),
        _ => ("Something went wrong", "An unexpected error occurred. Please try again later."),
    };
    let body = format!(
        "<h1>{heading}</h1><p>{text}</p><p><a href=\"/\">Back to the home page</a></p>"
    );
    layout(heading, &Chrome::default(), &body)
}

// --- Layout ---

fn layout(title: &str, chrome: &Chrome, body: &str) -> String {
    let category_links: String = chrome
        .categories
        .iter()
        .map(|c| format!("<a href=\"/category/{}\">{}</a> ", escape(&c.slug), escape(&c.name)))
        .collect();

    let account = match chrome.actor.user() {
        Some(user) => {
            let admin = if user.is_admin {
                "<a href=\"/admin\">Admin</a> "
            } else {
                ""
            };
            format!(
                "<span>{name}</span> <a href=\"/my-recipes\">My recipes</a> <a href=\"/recipe/add\">Add recipe</a> {admin}\
                 <form method=\"post\" action=\"/logout\" class=\"inline\"><button type=\"submit\">Log out</button></form>",
                name = escape(&user.username),
            )
        }
        None => "<a href=\"/login\">Log in</a> <a href=\"/register\">Register</a>".to_string(),
    };

    let flash = chrome
        .flash
        .as_ref()
        .map(|f| {
            format!(
                "<div class=\"flash flash-{}\" role=\"status\">{}</div>",
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} · Recipe Portal</title></head><body>\
         <header><nav><a href=\"/\"><strong>Recipe Portal</strong></a> {category_links}\
         <a href=\"/testimonials\">Testimonials</a> <a href=\"/about\">About</a> <a href=\"/contact\">Contact</a>\
         <span class=\"account\">{account}</span></nav></header>\
         {flash}<main>{body}</main><footer><p>Recipe Portal</p></footer></body></html>",
        title = escape(title),
    )
}

// --- Fragments ---

fn minutes(label: &str, value: Option<i32>) -> String {
    value
        .map(|v| format!("<li>{label}: {v} min</li>"))
        .unwrap_or_default()
}

fn image_tag(recipe: &Recipe) -> String {
    recipe
        .image
        .as_ref()
        .map(|image| {
            format!(
                "<img src=\"/static/uploads/{}\" alt=\"{}\">",
                escape(image),
                escape(&recipe.title)
            )
        })
        .unwrap_or_default()
}

fn recipe_cards(recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return "<p>No recipes yet.</p>".to_string();
    }
    let cards: String = recipes
        .iter()
        .map(|r| {
            format!(
                "<article class=\"recipe-card\"><a href=\"/recipe/{id}\">{img}<h3>{title}</h3></a>\
                 <p>{summary}</p><small>{category} · by {author}</small></article>",
                id = r.id,
                img = image_tag(r),
                title = escape(&r.title),
                summary = escape(&r.content),
                category = escape(r.category_name.as_deref().unwrap_or("")),
                author = escape(r.author_name.as_deref().unwrap_or("unknown")),
            )
        })
        .collect();
    format!("<section class=\"recipes\">{cards}</section>")
}

fn category_link(recipe: &Recipe) -> String {
    let name = escape(recipe.category_name.as_deref().unwrap_or(""));
    match recipe.category_slug.as_deref() {
        Some(slug) => format!("<a href=\"/category/{}\">{name}</a>", escape(slug)),
        None => name,
    }
}

fn lines_list(text: Option<&str>, ordered: bool) -> String {
    let items: String = text
        .unwrap_or("")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", escape(line)))
        .collect();
    if ordered {
        format!("<ol>{items}</ol>")
    } else {
        format!("<ul>{items}</ul>")
    }
}

fn stars(rating: Option<i32>) -> String {
    match rating {
        Some(n) => {
            let filled = n.clamp(0, 5) as usize;
            format!(
                "<span class=\"rating\" title=\"{n}/5\">{}{}</span>",
                "★".repeat(filled),
                "☆".repeat(5 - filled)
            )
        }
        None => String::new(),
    }
}

fn comment_items(comments: &[Comment], with_recipe: bool) -> String {
    if comments.is_empty() {
        return "<p>No comments yet.</p>".to_string();
    }
    let items: String = comments
        .iter()
        .map(|c| {
            let on = if with_recipe {
                format!(
                    " on <a href=\"/recipe/{}\">{}</a>",
                    c.recipe_id,
                    escape(c.recipe_title.as_deref().unwrap_or(""))
                )
            } else {
                String::new()
            };
            format!(
                "<li class=\"comment\"><strong>{author}</strong>{on} {stars}<p>{body}</p>\
                 <time>{at}</time></li>",
                author = escape(c.author_name.as_deref().unwrap_or("unknown")),
                stars = stars(c.rating),
                body = escape(&c.body),
                at = c.created_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();
    format!("<ul class=\"comments\">{items}</ul>")
}

fn post_button(action: &str, label: &str, confirm: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\" class=\"inline\" onsubmit=\"return confirm('{confirm}')\">\
         <button type=\"submit\">{label}</button></form>"
    )
}

fn text_input(name: &str, label: &str, value: &str, required: bool) -> String {
    let required = if required { " required" } else { "" };
    format!(
        "<label>{label}<input type=\"text\" name=\"{name}\" value=\"{}\"{required}></label>",
        escape(value)
    )
}

fn number_input(name: &str, label: &str, value: Option<i32>) -> String {
    let value = value.map(|v| v.to_string()).unwrap_or_default();
    format!("<label>{label}<input type=\"number\" min=\"0\" name=\"{name}\" value=\"{value}\"></label>")
}

fn textarea(name: &str, label: &str, value: &str, required: bool) -> String {
    let required = if required { " required" } else { "" };
    format!(
        "<label>{label}<textarea name=\"{name}\" rows=\"6\"{required}>{}</textarea></label>",
        escape(value)
    )
}

// --- Public views ---

fn index(recipes: &[Recipe], categories: &[Category]) -> String {
    let chips: String = categories
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"/category/{}\">{}</a></li>",
                escape(&c.slug),
                escape(&c.name)
            )
        })
        .collect();
    format!(
        "<h1>Latest recipes</h1>{}<h2>Categories</h2><ul class=\"categories\">{chips}</ul>",
        recipe_cards(recipes)
    )
}

fn category_view(category: &Category, recipes: &[Recipe]) -> String {
    format!(
        "<h1>{}</h1><p>{}</p>{}",
        escape(&category.name),
        escape(category.description.as_deref().unwrap_or("")),
        recipe_cards(recipes)
    )
}

fn recipe_detail(
    recipe: &Recipe,
    comments: &[Comment],
    related: &[Recipe],
    viewer: Option<&AuthUser>,
) -> String {
    let controls = match viewer {
        Some(user) if policy::can_modify(user, recipe.user_id) => format!(
            "<p class=\"controls\"><a href=\"/recipe/{id}/edit\">Edit</a> {delete}</p>",
            id = recipe.id,
            delete = post_button(
                &format!("/recipe/{}/delete", recipe.id),
                "Delete",
                "Delete this recipe?"
            ),
        ),
        _ => String::new(),
    };

    let comment_form = match viewer {
        Some(_) => format!(
            "<form method=\"post\" action=\"/recipe/{}/comment\">{}\
             <label>Rating<select name=\"rating\"><option value=\"\">No rating</option>\
             <option>5</option><option>4</option><option>3</option><option>2</option><option>1</option>\
             </select></label><button type=\"submit\">Post comment</button></form>",
            recipe.id,
            textarea("body", "Comment", "", true)
        ),
        None => format!(
            "<p><a href=\"/login?next=/recipe/{}\">Log in</a> to leave a comment.</p>",
            recipe.id
        ),
    };

    let related_section = if related.is_empty() {
        String::new()
    } else {
        format!("<h2>Related recipes</h2>{}", recipe_cards(related))
    };

    let servings = recipe
        .servings
        .map(|s| format!("<li>Servings: {s}</li>"))
        .unwrap_or_default();

    format!(
        "<article class=\"recipe\"><h1>{title}</h1>{controls}{img}\
         <p class=\"meta\">{category} · by {author} · {created}</p>\
         <ul class=\"facts\">{prep}{cook}{servings}</ul><p>{summary}</p>\
         <h2>Ingredients</h2>{ingredients}<h2>Instructions</h2>{instructions}</article>\
         <section><h2>Comments ({count})</h2>{comment_form}{comments}</section>{related_section}",
        title = escape(&recipe.title),
        img = image_tag(recipe),
        category = category_link(recipe),
        author = escape(recipe.author_name.as_deref().unwrap_or("unknown")),
        created = recipe.created_at.format("%Y-%m-%d"),
        prep = minutes("Preparation", recipe.prep_time),
        cook = minutes("Cooking", recipe.cook_time),
        summary = escape(&recipe.content),
        ingredients = lines_list(recipe.ingredients.as_deref(), false),
        instructions = lines_list(recipe.instructions.as_deref(), true),
        count = comments.len(),
        comments = comment_items(comments, false),
    )
}

fn static_page(heading: &str, page: Option<&StaticPage>) -> String {
    match page {
        Some(page) => format!("<h1>{}</h1><div class=\"page\">{}</div>", escape(&page.title), page.content),
        None => format!("<h1>{}</h1><p>Nothing here yet.</p>", escape(heading)),
    }
}

fn testimonials(comments: &[Comment]) -> String {
    format!(
        "<h1>What our cooks say</h1>{}",
        comment_items(comments, true)
    )
}

fn register() -> String {
    format!(
        "<h1>Register</h1><form method=\"post\" action=\"/register\">{}\
         <label>Password<input type=\"password\" name=\"password\" required></label>\
         <label>Confirm password<input type=\"password\" name=\"password_confirm\" required></label>\
         <button type=\"submit\">Register</button></form>\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
        text_input("username", "Username", "", true)
    )
}

fn login(next: Option<&str>) -> String {
    let hidden = next
        .map(|n| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">", escape(n)))
        .unwrap_or_default();
    format!(
        "<h1>Log in</h1><form method=\"post\" action=\"/login\">{hidden}{}\
         <label>Password<input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Log in</button></form>\
         <p>No account yet? <a href=\"/register\">Register</a></p>",
        text_input("username", "Username", "", true)
    )
}

// --- Member views ---

fn my_recipes(recipes: &[Recipe]) -> String {
    let rows: String = recipes
        .iter()
        .map(|r| {
            format!(
                "<tr><td><a href=\"/recipe/{id}\">{title}</a></td><td>{category}</td><td>{created}</td>\
                 <td><a href=\"/recipe/{id}/edit\">Edit</a> {delete}</td></tr>",
                id = r.id,
                title = escape(&r.title),
                category = escape(r.category_name.as_deref().unwrap_or("")),
                created = r.created_at.format("%Y-%m-%d"),
                delete = post_button(&format!("/recipe/{}/delete", r.id), "Delete", "Delete this recipe?"),
            )
        })
        .collect();
    format!(
        "<h1>My recipes</h1><p><a href=\"/recipe/add\">Add a recipe</a></p>\
         <table><thead><tr><th>Title</th><th>Category</th><th>Created</th><th></th></tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

fn recipe_form(recipe: Option<&Recipe>, categories: &[Category]) -> String {
    let (action, heading) = match recipe {
        Some(r) => (format!("/recipe/{}/edit", r.id), "Edit recipe"),
        None => ("/recipe/add".to_string(), "Add recipe"),
    };
    let selected = recipe.map(|r| r.category_id);
    let options: String = categories
        .iter()
        .map(|c| {
            let sel = if Some(c.id) == selected { " selected" } else { "" };
            format!("<option value=\"{}\"{sel}>{}</option>", c.id, escape(&c.name))
        })
        .collect();
    let current_image = recipe
        .and_then(|r| r.image.as_ref().map(|_| image_tag(r)))
        .unwrap_or_default();

    format!(
        "<h1>{heading}</h1><form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\
         {title}{content}\
         <label>Category<select name=\"category_id\" required><option value=\"\">Choose…</option>{options}</select></label>\
         {ingredients}{instructions}{prep}{cook}{servings}\
         {current_image}<label>Image<input type=\"file\" name=\"image\" accept=\"image/*\"></label>\
         <button type=\"submit\">Save</button></form>",
        title = text_input("title", "Title", recipe.map(|r| r.title.as_str()).unwrap_or(""), true),
        content = textarea("content", "Summary", recipe.map(|r| r.content.as_str()).unwrap_or(""), true),
        ingredients = textarea(
            "ingredients",
            "Ingredients (one per line)",
            recipe.and_then(|r| r.ingredients.as_deref()).unwrap_or(""),
            false
        ),
        instructions = textarea(
            "instructions",
            "Instructions (one step per line)",
            recipe.and_then(|r| r.instructions.as_deref()).unwrap_or(""),
            false
        ),
        prep = number_input("prep_time", "Preparation (min)", recipe.and_then(|r| r.prep_time)),
        cook = number_input("cook_time", "Cooking (min)", recipe.and_then(|r| r.cook_time)),
        servings = number_input("servings", "Servings", recipe.and_then(|r| r.servings)),
    )
}

// --- Admin views ---

fn admin_nav() -> &'static str {
    "<nav class=\"admin\"><a href=\"/admin\">Dashboard</a> <a href=\"/admin/recipes\">Recipes</a> \
     <a href=\"/admin/categories\">Categories</a> <a href=\"/admin/users\">Users</a> \
     <a href=\"/admin/comments\">Comments</a> <a href=\"/admin/pages\">Pages</a></nav>"
}

fn admin_dashboard(stats: &DashboardStats) -> String {
    format!(
        "{nav}<h1>Dashboard</h1><ul class=\"stats\"><li>Users: {}</li><li>Recipes: {}</li>\
         <li>Categories: {}</li><li>Comments: {}</li></ul>",
        stats.users,
        stats.recipes,
        stats.categories,
        stats.comments,
        nav = admin_nav(),
    )
}

fn admin_recipes(recipes: &[Recipe]) -> String {
    let rows: String = recipes
        .iter()
        .map(|r| {
            format!(
                "<tr><td><a href=\"/recipe/{id}\">{title}</a></td><td>{author}</td><td>{category}</td>\
                 <td>{created}</td><td><a href=\"/recipe/{id}/edit\">Edit</a> {delete}</td></tr>",
                id = r.id,
                title = escape(&r.title),
                author = escape(r.author_name.as_deref().unwrap_or("")),
                category = escape(r.category_name.as_deref().unwrap_or("")),
                created = r.created_at.format("%Y-%m-%d"),
                delete = post_button(&format!("/admin/recipes/{}/delete", r.id), "Delete", "Delete this recipe?"),
            )
        })
        .collect();
    format!(
        "{}<h1>Recipes</h1><table><thead><tr><th>Title</th><th>Author</th><th>Category</th>\
         <th>Created</th><th></th></tr></thead><tbody>{rows}</tbody></table>",
        admin_nav()
    )
}

fn admin_categories(categories: &[Category]) -> String {
    let rows: String = categories
        .iter()
        .map(|c| {
            format!(
                "<tr><td>{name}</td><td>{slug}</td><td>{description}</td>\
                 <td><a href=\"/admin/categories/{id}/edit\">Edit</a> {delete}</td></tr>",
                id = c.id,
                name = escape(&c.name),
                slug = escape(&c.slug),
                description = escape(c.description.as_deref().unwrap_or("")),
                delete = post_button(&format!("/admin/categories/{}/delete", c.id), "Delete", "Delete this category?"),
            )
        })
        .collect();
    format!(
        "{}<h1>Categories</h1><p><a href=\"/admin/categories/add\">Add category</a></p>\
         <table><thead><tr><th>Name</th><th>Slug</th><th>Description</th><th></th></tr></thead>\
         <tbody>{rows}</tbody></table>",
        admin_nav()
    )
}

fn category_form(category: Option<&Category>) -> String {
    let action = match category {
        Some(c) => format!("/admin/categories/{}/edit", c.id),
        None => "/admin/categories/add".to_string(),
    };
    format!(
        "{nav}<h1>{heading}</h1><form method=\"post\" action=\"{action}\">{name}{slug}{description}\
         <button type=\"submit\">Save</button></form>",
        nav = admin_nav(),
        heading = if category.is_some() { "Edit category" } else { "Add category" },
        name = text_input("name", "Name", category.map(|c| c.name.as_str()).unwrap_or(""), true),
        slug = text_input("slug", "Slug", category.map(|c| c.slug.as_str()).unwrap_or(""), true),
        description = textarea(
            "description",
            "Description",
            category.and_then(|c| c.description.as_deref()).unwrap_or(""),
            false
        ),
    )
}

fn admin_users(users: &[User], viewer: Option<&AuthUser>) -> String {
    let viewer_id = viewer.map(|u| u.id);
    let rows: String = users
        .iter()
        .map(|u| {
            let actions = if Some(u.id) == viewer_id {
                "<em>you</em>".to_string()
            } else {
                format!(
                    "{} {}",
                    post_button(
                        &format!("/admin/users/{}/toggle-admin", u.id),
                        if u.is_admin { "Revoke admin" } else { "Make admin" },
                        "Change this user's admin status?"
                    ),
                    post_button(&format!("/admin/users/{}/delete", u.id), "Delete", "Delete this user and their content?"),
                )
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{actions}</td></tr>",
                escape(&u.username),
                if u.is_admin { "admin" } else { "member" },
                u.created_at.format("%Y-%m-%d"),
            )
        })
        .collect();
    format!(
        "{}<h1>Users</h1><table><thead><tr><th>Username</th><th>Role</th><th>Joined</th><th></th></tr></thead>\
         <tbody>{rows}</tbody></table>",
        admin_nav()
    )
}

fn admin_comments(comments: &[Comment]) -> String {
    let rows: String = comments
        .iter()
        .map(|c| {
            format!(
                "<tr><td>{author}</td><td><a href=\"/recipe/{recipe_id}\">{recipe}</a></td><td>{body}</td>\
                 <td>{rating}</td><td>{delete}</td></tr>",
                author = escape(c.author_name.as_deref().unwrap_or("")),
                recipe_id = c.recipe_id,
                recipe = escape(c.recipe_title.as_deref().unwrap_or("")),
                body = escape(&c.body),
                rating = c.rating.map(|r| r.to_string()).unwrap_or_default(),
                delete = post_button(&format!("/admin/comments/{}/delete", c.id), "Delete", "Delete this comment?"),
            )
        })
        .collect();
    format!(
        "{}<h1>Comments</h1><table><thead><tr><th>Author</th><th>Recipe</th><th>Comment</th>\
         <th>Rating</th><th></th></tr></thead><tbody>{rows}</tbody></table>",
        admin_nav()
    )
}

fn admin_pages(pages: &[StaticPage]) -> String {
    let rows: String = pages
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{slug}</td><td>{title}</td><td><a href=\"/admin/pages/{id}/edit\">Edit</a> {delete}</td></tr>",
                id = p.id,
                slug = escape(&p.slug),
                title = escape(&p.title),
                delete = post_button(&format!("/admin/pages/{}/delete", p.id), "Delete", "Delete this page?"),
            )
        })
        .collect();
    format!(
        "{}<h1>Pages</h1><p><a href=\"/admin/pages/add\">Add page</a></p>\
         <table><thead><tr><th>Slug</th><th>Title</th><th></th></tr></thead><tbody>{rows}</tbody></table>",
        admin_nav()
    )
}

fn page_form(page: Option<&StaticPage>) -> String {
    let action = match page {
        Some(p) => format!("/admin/pages/{}/edit", p.id),
        None => "/admin/pages/add".to_string(),
    };
    format!(
        "{nav}<h1>{heading}</h1><form method=\"post\" action=\"{action}\">{slug}{title}{content}\
         <button type=\"submit\">Save</button></form>",
        nav = admin_nav(),
        heading = if page.is_some() { "Edit page" } else { "Add page" },
        slug = text_input("slug", "Slug", page.map(|p| p.slug.as_str()).unwrap_or(""), true),
        title = text_input("title", "Title", page.map(|p| p.title.as_str()).unwrap_or(""), true),
        content = textarea("content", "Content (HTML)", page.map(|p| p.content.as_str()).unwrap_or(""), false),
    )
}
