//! Profile pages

use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context as TeraContext;

use crate::forms::{FieldErrors, ProfileForm};
use crate::models::User;
use crate::services::UserServiceError;
use crate::web::common::{insert_page, Form, PageQuery, Path};
use crate::web::middleware::{profile_url, AppState, CurrentUser, RequireUser, WebError};

/// GET /profile/{username}/
///
/// The owner sees every post they wrote; everyone else only the public ones.
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let profile = state
        .user_service
        .get_by_username(&username)
        .await?
        .ok_or(WebError::NotFound)?;
    let posts = state
        .post_service
        .list_by_author(&profile, user.as_ref(), query.page.as_deref())
        .await?;

    let mut context = TeraContext::new();
    context.insert("profile", &profile);
    context.insert("profile_name", &profile.display_name());
    context.insert("is_owner", &user.as_ref().is_some_and(|u| u.id == profile.id));
    insert_page(&mut context, "posts", &posts);
    state.render("blog/profile.html", &context, user.as_ref(), &uri)
}

fn render_edit(
    state: &AppState,
    user: &User,
    uri: &Uri,
    form: &ProfileForm,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);
    state.render("blog/user.html", &context, Some(user), uri)
}

/// GET /profile/{username}/edit/ - always edits the signed-in account
pub async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    render_edit(&state, &user, &uri, &ProfileForm::from_user(&user), &FieldErrors::new())
}

/// POST /profile/{username}/edit/
pub async fn edit_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    uri: Uri,
    Form(form): Form<ProfileForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok(input) => state.user_service.update_profile(&user, input).await,
        Err(errors) => Err(UserServiceError::ValidationError(errors)),
    };
    match result {
        Ok(updated) => Ok(Redirect::to(&profile_url(&updated.username)).into_response()),
        Err(UserServiceError::ValidationError(errors)) => {
            Ok(render_edit(&state, &user, &uri, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
