//! Post pages: listings, detail, create/edit/delete

use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tera::Context as TeraContext;

use crate::forms::{CommentForm, FieldErrors, PostForm};
use crate::models::{Post, User};
use crate::services::{can_view_post, PostServiceError};
use crate::web::common::{insert_page, Form, PageQuery, Path};
use crate::web::middleware::{
    admin_posts_url, post_url, profile_url, AppState, CurrentUser, RequireUser, WebError,
};

/// GET / - public posts, newest first
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let posts = state.post_service.list_public(query.page.as_deref()).await?;

    let mut context = TeraContext::new();
    insert_page(&mut context, "posts", &posts);
    state.render("blog/index.html", &context, user.as_ref(), &uri)
}

/// GET /category/{slug}/ - public posts of a published category
pub async fn category_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let (category, posts) = state
        .post_service
        .list_by_category(&slug, query.page.as_deref())
        .await?;

    let mut context = TeraContext::new();
    context.insert("category", &category);
    insert_page(&mut context, "posts", &posts);
    state.render("blog/category.html", &context, user.as_ref(), &uri)
}

/// GET /posts/{id}/
pub async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let post = state.post_service.get_visible(id, user.as_ref()).await?;
    render_detail(&state, user.as_ref(), &uri, &post, &CommentForm::default(), &FieldErrors::new()).await
}

/// Detail page, also used to re-show a rejected comment
pub(crate) async fn render_detail(
    state: &AppState,
    user: Option<&User>,
    uri: &Uri,
    post: &Post,
    form: &CommentForm,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let comments = state.comment_service.list_for_post(post.id).await?;

    let mut context = TeraContext::new();
    context.insert("post", post);
    context.insert("location", &post.visible_location());
    context.insert("comments", &comments);
    context.insert("form", form);
    context.insert("errors", errors);
    state.render("blog/detail.html", &context, user, uri)
}

/// Which variant of `blog/create.html` to show
#[derive(Clone, Copy)]
enum FormMode {
    Create,
    Edit,
    Delete,
}

impl FormMode {
    fn as_str(self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Edit => "edit",
            FormMode::Delete => "delete",
        }
    }
}

async fn render_post_form(
    state: &AppState,
    user: &User,
    uri: &Uri,
    mode: FormMode,
    post: Option<&Post>,
    form: &PostForm,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let (categories, locations) = state.post_service.form_choices().await?;

    let mut context = TeraContext::new();
    context.insert("mode", mode.as_str());
    context.insert("post", &post);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("categories", &categories);
    context.insert("locations", &locations);
    state.render("blog/create.html", &context, Some(user), uri)
}

/// GET /posts/create/
pub async fn create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    render_post_form(&state, &user, &uri, FormMode::Create, None, &PostForm::new_post(), &FieldErrors::new()).await
}

/// POST /posts/create/ - the author is always the requester
pub async fn create_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Form(form): Form<PostForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok(input) => state.post_service.create(&user, input).await,
        Err(errors) => Err(PostServiceError::ValidationError(errors)),
    };
    match result {
        Ok(_) => Ok(Redirect::to(&profile_url(&user.username)).into_response()),
        Err(PostServiceError::ValidationError(errors)) => {
            Ok(render_post_form(&state, &user, &uri, FormMode::Create, None, &form, &errors)
                .await?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let post = state.post_service.get_for_edit(id, &user).await?;
    let form = PostForm::from_post(&post);
    render_post_form(&state, &user, &uri, FormMode::Edit, Some(&post), &form, &FieldErrors::new()).await
}

/// POST /posts/{id}/edit/
pub async fn edit_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, WebError> {
    // Ownership is checked before the form so a stranger never sees errors
    let post = state.post_service.get_for_edit(id, &user).await?;

    let result = match form.validate() {
        Ok(input) => state.post_service.update(id, &user, input).await,
        Err(errors) => Err(PostServiceError::ValidationError(errors)),
    };
    match result {
        Ok(updated) => Ok(Redirect::to(&after_edit_url(&user, &updated)).into_response()),
        Err(PostServiceError::ValidationError(errors)) => Ok(render_post_form(
            &state,
            &user,
            &uri,
            FormMode::Edit,
            Some(&post),
            &form,
            &errors,
        )
        .await?
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// The detail page, or for a superuser who edited a post still hidden from
/// them, the moderation list of its author.
fn after_edit_url(user: &User, post: &Post) -> String {
    if can_view_post(Some(user), post, Utc::now()) {
        post_url(post.id)
    } else {
        admin_posts_url(&post.author.username)
    }
}

/// GET /posts/{id}/delete/ - confirmation page
pub async fn delete_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let post = state.post_service.get_for_edit(id, &user).await?;
    let form = PostForm::from_post(&post);
    render_post_form(&state, &user, &uri, FormMode::Delete, Some(&post), &form, &FieldErrors::new()).await
}

/// POST /posts/{id}/delete/
pub async fn delete_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<Redirect, WebError> {
    let post = state.post_service.delete(id, &user).await?;
    Ok(Redirect::to(&profile_url(&post.author.username)))
}
