//! Registration, login and logout

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context as TeraContext;

use crate::forms::{FieldErrors, LoginForm, RegistrationForm, NON_FIELD_ERRORS};
use crate::models::User;
use crate::services::UserServiceError;
use crate::web::common::{safe_next, Form, NextQuery};
use crate::web::middleware::{
    clear_session_cookie, extract_session_token, AppState, CurrentUser, WebError,
};

fn render_registration(
    state: &AppState,
    user: Option<&User>,
    uri: &Uri,
    form: &RegistrationForm,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);
    state.render("registration/registration_form.html", &context, user, uri)
}

/// GET /auth/registration/
pub async fn registration_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    render_registration(&state, user.as_ref(), &uri, &RegistrationForm::default(), &FieldErrors::new())
}

/// POST /auth/registration/ - on success continue to the login page
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, WebError> {
    let result = match form.validate() {
        Ok(input) => state.user_service.register(input).await,
        Err(errors) => Err(UserServiceError::ValidationError(errors)),
    };
    match result {
        Ok(_) => Ok(Redirect::to("/auth/login/").into_response()),
        Err(UserServiceError::ValidationError(errors)) => {
            Ok(render_registration(&state, user.as_ref(), &uri, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

fn render_login(
    state: &AppState,
    user: Option<&User>,
    uri: &Uri,
    form: &LoginForm,
    next: Option<&str>,
    errors: &FieldErrors,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("next", &next);
    context.insert("errors", errors);
    state.render("registration/login.html", &context, user, uri)
}

/// GET /auth/login/
pub async fn login_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, WebError> {
    render_login(
        &state,
        user.as_ref(),
        &uri,
        &LoginForm::default(),
        query.next.as_deref(),
        &FieldErrors::new(),
    )
}

/// POST /auth/login/ - sets the session cookie and follows `next`
pub async fn login(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    match state.user_service.login(&form.username, &form.password).await {
        Ok((_, session)) => {
            let mut headers = HeaderMap::new();
            let cookie = HeaderValue::from_str(&state.session_cookie(&session.id))
                .map_err(|e| WebError::Internal(e.into()))?;
            headers.insert(header::SET_COOKIE, cookie);
            let target = safe_next(query.next.as_deref());
            Ok((headers, Redirect::to(&target)).into_response())
        }
        Err(UserServiceError::AuthenticationError(_)) => {
            let errors = FieldErrors::single(
                NON_FIELD_ERRORS,
                "Please enter a correct username and password.",
            );
            Ok(render_login(&state, user.as_ref(), &uri, &form, query.next.as_deref(), &errors)?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/logout/
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&clear_session_cookie()).map_err(|e| WebError::Internal(e.into()))?,
    );
    Ok((response_headers, Redirect::to("/")).into_response())
}
