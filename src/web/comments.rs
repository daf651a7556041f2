//! Comment handlers
//!
//! Comments live under their post: `/posts/{id}/comment/...`. The post is
//! always taken from the path, never from the form.

use axum::{
    extract::State,
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context as TeraContext;

use crate::forms::{CommentForm, FieldErrors};
use crate::models::{Comment, User};
use crate::services::PostServiceError;
use crate::web::common::{Form, Path};
use crate::web::middleware::{admin_comments_url, post_url, AppState, RequireUser, WebError};
use crate::web::posts::render_detail;

/// POST /posts/{id}/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, WebError> {
    match form.validate() {
        Ok(text) => {
            state.comment_service.create(post_id, &user, &text).await?;
            Ok(Redirect::to(&post_url(post_id)).into_response())
        }
        Err(errors) => {
            let post = state.post_service.get_visible(post_id, Some(&user)).await?;
            Ok(render_detail(&state, Some(&user), &uri, &post, &form, &errors)
                .await?
                .into_response())
        }
    }
}

fn render_comment_page(
    state: &AppState,
    user: &User,
    uri: &Uri,
    comment: &Comment,
    deleting: bool,
    form: &CommentForm,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("comment", comment);
    context.insert("deleting", &deleting);
    context.insert("form", form);
    context.insert("errors", errors);
    state.render("blog/comment.html", &context, Some(user), uri)
}

/// GET /posts/{id}/comment/{cid}/edit/
pub async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Html<String>, WebError> {
    let comment = state
        .comment_service
        .get_for_edit(post_id, comment_id, &user)
        .await?;
    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_page(&state, &user, &uri, &comment, false, &form, &FieldErrors::new())
}

/// POST /posts/{id}/comment/{cid}/edit/
pub async fn edit_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> Result<Response, WebError> {
    let comment = state
        .comment_service
        .get_for_edit(post_id, comment_id, &user)
        .await?;

    match form.validate() {
        Ok(text) => {
            state
                .comment_service
                .update(post_id, comment_id, &user, &text)
                .await?;
            let target = after_change_url(&state, &user, post_id).await?;
            Ok(Redirect::to(&target).into_response())
        }
        Err(errors) => Ok(
            render_comment_page(&state, &user, &uri, &comment, false, &form, &errors)?
                .into_response(),
        ),
    }
}

/// GET /posts/{id}/comment/{cid}/delete/ - confirmation page
pub async fn delete_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Html<String>, WebError> {
    let comment = state
        .comment_service
        .get_for_edit(post_id, comment_id, &user)
        .await?;
    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_page(&state, &user, &uri, &comment, true, &form, &FieldErrors::new())
}

/// POST /posts/{id}/comment/{cid}/delete/
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Redirect, WebError> {
    state
        .comment_service
        .delete(post_id, comment_id, &user)
        .await?;
    let target = after_change_url(&state, &user, post_id).await?;
    Ok(Redirect::to(&target))
}

/// The post's detail page, or the post's comment moderation list when the
/// post is hidden from `user` (a superuser moderating a draft).
async fn after_change_url(state: &AppState, user: &User, post_id: i64) -> Result<String, WebError> {
    match state.post_service.get_visible(post_id, Some(user)).await {
        Ok(_) => Ok(post_url(post_id)),
        Err(PostServiceError::NotFound) => Ok(admin_comments_url(post_id)),
        Err(e) => Err(e.into()),
    }
}
