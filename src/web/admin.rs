//! Superuser pages
//!
//! Categories and locations: every row with an inline edit form, plus a
//! form for a new row. A rejected form re-renders the page with its errors.
//!
//! Posts and comments: moderation lists that ignore visibility, so drafts
//! and posts in hidden categories can be found. Posts are filtered by
//! category and author, searched by title, and published or moved to
//! another category inline.

use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use crate::forms::{CategoryForm, FieldErrors, LocationForm, ModerationForm};
use crate::models::User;
use crate::services::{CategoryServiceError, PostServiceError};
use crate::web::common::{insert_page, page_query, Form, Path};
use crate::web::middleware::{AppState, RequireSuperuser, WebError, ADMIN_POSTS_URL};

const CATEGORIES_URL: &str = "/admin/categories/";
const LOCATIONS_URL: &str = "/admin/locations/";

/// A form that failed validation and which row it belongs to (`None` = new row)
#[derive(Serialize)]
struct Rejected<'a, F: Serialize> {
    id: Option<i64>,
    form: &'a F,
    errors: &'a FieldErrors,
}

async fn render_categories(
    state: &AppState,
    user: &User,
    uri: &Uri,
    rejected: Option<Rejected<'_, CategoryForm>>,
) -> Result<Html<String>, WebError> {
    let categories = state.category_service.list().await?;
    let mut context = TeraContext::new();
    context.insert("categories", &categories);
    context.insert("rejected", &rejected);
    state.render("admin/categories.html", &context, Some(user), uri)
}

/// GET /admin/categories/
pub async fn categories(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    render_categories(&state, &user, &uri, None).await
}

/// POST /admin/categories/
pub async fn create_category(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Form(form): Form<CategoryForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok(input) => state.category_service.create(input).await,
        Err(errors) => Err(CategoryServiceError::ValidationError(errors)),
    };
    category_outcome(&state, &user, &uri, None, &form, result.map(|_| ())).await
}

/// POST /admin/categories/{id}/
pub async fn update_category(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok(input) => state.category_service.update(id, input).await,
        Err(errors) => Err(CategoryServiceError::ValidationError(errors)),
    };
    category_outcome(&state, &user, &uri, Some(id), &form, result.map(|_| ())).await
}

async fn category_outcome(
    state: &AppState,
    user: &User,
    uri: &Uri,
    id: Option<i64>,
    form: &CategoryForm,
    result: Result<(), CategoryServiceError>,
) -> Result<Response, WebError> {
    match result {
        Ok(()) => Ok(Redirect::to(CATEGORIES_URL).into_response()),
        Err(CategoryServiceError::ValidationError(errors)) => {
            let rejected = Rejected {
                id,
                form,
                errors: &errors,
            };
            Ok(render_categories(state, user, uri, Some(rejected))
                .await?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_locations(
    state: &AppState,
    user: &User,
    uri: &Uri,
    rejected: Option<Rejected<'_, LocationForm>>,
) -> Result<Html<String>, WebError> {
    let locations = state.location_service.list().await?;
    let mut context = TeraContext::new();
    context.insert("locations", &locations);
    context.insert("rejected", &rejected);
    state.render("admin/locations.html", &context, Some(user), uri)
}

/// GET /admin/locations/
pub async fn locations(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    render_locations(&state, &user, &uri, None).await
}

/// POST /admin/locations/
pub async fn create_location(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Form(form): Form<LocationForm>,
) -> Result<Response, WebError> {
    match form.validate() {
        Ok(input) => {
            state.location_service.create(input).await?;
            Ok(Redirect::to(LOCATIONS_URL).into_response())
        }
        Err(errors) => {
            let rejected = Rejected {
                id: None,
                form: &form,
                errors: &errors,
            };
            Ok(render_locations(&state, &user, &uri, Some(rejected))
                .await?
                .into_response())
        }
    }
}

/// POST /admin/locations/{id}/
pub async fn update_location(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Path(id): Path<i64>,
    Form(form): Form<LocationForm>,
) -> Result<Response, WebError> {
    match form.validate() {
        Ok(input) => {
            state.location_service.update(id, input).await?;
            Ok(Redirect::to(LOCATIONS_URL).into_response())
        }
        Err(errors) => {
            let rejected = Rejected {
                id: Some(id),
                form: &form,
                errors: &errors,
            };
            Ok(render_locations(&state, &user, &uri, Some(rejected))
                .await?
                .into_response())
        }
    }
}

/// Filters of the post moderation list, echoed back into the filter form
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostSearch {
    /// Category ID
    pub category: Option<String>,
    /// Author username
    pub author: Option<String>,
    /// Title substring
    pub q: Option<String>,
    pub page: Option<String>,
}

impl PostSearch {
    fn category_id(&self) -> Option<i64> {
        self.category.as_deref().and_then(|c| c.trim().parse().ok())
    }
}

async fn render_posts(
    state: &AppState,
    user: &User,
    uri: &Uri,
    search: &PostSearch,
    rejected: Option<Rejected<'_, ModerationForm>>,
) -> Result<Html<String>, WebError> {
    let posts = state
        .post_service
        .list_all(
            search.category_id(),
            search.author.as_deref(),
            search.q.as_deref(),
            search.page.as_deref(),
        )
        .await?;
    let (categories, _) = state.post_service.form_choices().await?;

    let mut context = TeraContext::new();
    insert_page(&mut context, "posts", &posts);
    context.insert("categories", &categories);
    context.insert("search", search);
    context.insert("rejected", &rejected);
    context.insert(
        "page_query",
        &page_query(&[
            ("category", search.category.as_deref()),
            ("author", search.author.as_deref()),
            ("q", search.q.as_deref()),
        ]),
    );
    state.render("admin/posts.html", &context, Some(user), uri)
}

/// GET /admin/posts/?category=&author=&q=&page=
pub async fn posts(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Query(search): Query<PostSearch>,
) -> Result<Html<String>, WebError> {
    render_posts(&state, &user, &uri, &search, None).await
}

/// POST /admin/posts/{id}/ - inline publish flag and category
pub async fn moderate_post(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Path(id): Path<i64>,
    Form(form): Form<ModerationForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok((is_published, category_id)) => {
            state
                .post_service
                .moderate(id, &user, is_published, category_id)
                .await
        }
        Err(errors) => Err(PostServiceError::ValidationError(errors)),
    };
    match result {
        Ok(_) => Ok(Redirect::to(ADMIN_POSTS_URL).into_response()),
        Err(PostServiceError::ValidationError(errors)) => {
            let rejected = Rejected {
                id: Some(id),
                form: &form,
                errors: &errors,
            };
            Ok(render_posts(&state, &user, &uri, &PostSearch::default(), Some(rejected))
                .await?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `?post=N&page=M` on the comment moderation list
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CommentSearch {
    pub post: Option<String>,
    pub page: Option<String>,
}

/// GET /admin/comments/?post= - newest first, optionally of one post
pub async fn comments(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    uri: Uri,
    Query(search): Query<CommentSearch>,
) -> Result<Html<String>, WebError> {
    let post_id = match search.post.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| WebError::NotFound)?),
    };
    let comments = state
        .comment_service
        .list_all(post_id, search.page.as_deref())
        .await?;

    let mut context = TeraContext::new();
    insert_page(&mut context, "comments", &comments);
    context.insert("post_id", &post_id);
    context.insert("page_query", &page_query(&[("post", search.post.as_deref())]));
    state.render("admin/comments.html", &context, Some(&user), &uri)
}
