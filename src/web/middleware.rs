//! Web middleware
//!
//! Contains:
//! - `AppState`, shared by every handler
//! - Session lookup (`optional_auth`) and the `CurrentUser`/`RequireUser` extractors
//! - `WebError` and the middleware that turns it into an HTML error page

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use tera::Context as TeraContext;

use crate::config::{Config, SessionConfig, SiteConfig};
use crate::db::repositories::{
    CommentRepositoryImpl, SqlxCategoryRepository, SqlxLocationRepository, SqlxPostRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{
    CategoryService, CategoryServiceError, CommentService, CommentServiceError, LocationService,
    LocationServiceError, PostService, PostServiceError, UserService, UserServiceError,
};
use crate::theme::{StandardTemplateVars, TemplateEngine};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub category_service: Arc<CategoryService>,
    pub location_service: Arc<LocationService>,
    pub templates: Arc<TemplateEngine>,
    pub site: Arc<SiteConfig>,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    /// Wire repositories and services on top of `pool`
    pub fn new(pool: DynDatabasePool, config: &Config) -> anyhow::Result<Self> {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let location_repo = SqlxLocationRepository::boxed(pool.clone());
        let comment_repo = CommentRepositoryImpl::boxed(pool.clone());

        Ok(Self {
            user_service: Arc::new(UserService::with_session_lifetime(
                user_repo,
                session_repo,
                config.session.lifetime_days,
            )),
            post_service: Arc::new(PostService::new(
                post_repo.clone(),
                category_repo.clone(),
                location_repo.clone(),
            )),
            comment_service: Arc::new(CommentService::new(comment_repo, post_repo)),
            category_service: Arc::new(CategoryService::new(category_repo)),
            location_service: Arc::new(LocationService::new(location_repo)),
            templates: Arc::new(TemplateEngine::new()?),
            site: Arc::new(config.site.clone()),
            session: Arc::new(config.session.clone()),
            pool,
        })
    }

    /// Render a page with the standard variables filled in
    pub fn render(
        &self,
        template: &str,
        context: &TeraContext,
        user: Option<&User>,
        uri: &Uri,
    ) -> Result<Html<String>, WebError> {
        let vars = self.standard_vars(user, uri.path());
        let html = self
            .templates
            .render_with_standard_vars(template, context, &vars)
            .map_err(WebError::Internal)?;
        Ok(Html(html))
    }

    fn standard_vars(&self, user: Option<&User>, path: &str) -> StandardTemplateVars {
        StandardTemplateVars::new(&self.site.name, &self.site.description, path).with_user(user)
    }

    /// `Set-Cookie` value opening a session
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.session.lifetime_days * 24 * 60 * 60
        );
        if self.session.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Extract the session token from the `Cookie` header
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| cookie.trim().strip_prefix("session="))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// The signed-in user, if any.
///
/// Filled in by `optional_auth`; absent or expired sessions give `None`.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// A signed-in user. Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

/// A signed-in superuser. Others get a 403 page.
#[derive(Debug, Clone)]
pub struct RequireSuperuser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned().unwrap_or_default())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".to_string());
                Err(WebError::LoginRequired { next })
            }
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequireSuperuser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if !user.is_superuser {
            tracing::warn!("User {} tried to reach {}", user.username, parts.uri.path());
            return Err(WebError::Forbidden);
        }
        Ok(RequireSuperuser(user))
    }
}

impl From<Infallible> for WebError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Session middleware: resolves the cookie to a user for every request
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut user = None;
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(found) => user = found,
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Errors a page handler can end with
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Unknown object, or a post hidden from the requester
    #[error("Not found")]
    NotFound,

    /// Signed in, but not allowed
    #[error("Forbidden")]
    Forbidden,

    /// Anonymous request to a page that needs a user
    #[error("Login required for {next}")]
    LoginRequired { next: String },

    /// Request the page cannot use, such as a body that is not a form
    #[error("Bad request ({0})")]
    BadRequest(StatusCode),

    /// Refused change; send the user elsewhere without touching anything
    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

/// Marker left on error responses for `render_error_pages`
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match self {
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Forbidden => StatusCode::FORBIDDEN,
            WebError::BadRequest(status) => status,
            WebError::LoginRequired { next } => {
                let target = format!("/auth/login/?next={}", urlencoding::encode(&next));
                return Redirect::to(&target).into_response();
            }
            WebError::Redirect(target) => return Redirect::to(&target).into_response(),
            WebError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(ErrorPage);
        response
    }
}

/// Replace the body of bare error responses with the matching error template
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let user = request.extensions().get::<CurrentUser>().cloned().unwrap_or_default();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let status = response.status();
    if response.extensions().get::<ErrorPage>().is_none() {
        return response;
    }

    let template = match status {
        StatusCode::NOT_FOUND => "errors/404.html",
        StatusCode::FORBIDDEN => "errors/403.html",
        s if s.is_client_error() => "errors/400.html",
        _ => "errors/500.html",
    };
    let vars = state.standard_vars(user.0.as_ref(), &path);
    let html = state
        .templates
        .render_with_standard_vars(template, &TeraContext::new(), &vars)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to render error page: {}", e);
            TemplateEngine::simple_error_page(status.as_u16(), status.canonical_reason().unwrap_or("Error"))
        });
    (status, Html(html)).into_response()
}

/// 404 for every unknown route
pub async fn not_found() -> WebError {
    WebError::NotFound
}

impl From<PostServiceError> for WebError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound => WebError::NotFound,
            PostServiceError::NotOwner { post_id } => WebError::Redirect(post_url(post_id)),
            PostServiceError::ValidationError(errors) => {
                WebError::Internal(anyhow::anyhow!("Unhandled validation error: {}", errors))
            }
            PostServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<CommentServiceError> for WebError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::NotFound => WebError::NotFound,
            CommentServiceError::NotOwner { post_id } => WebError::Redirect(post_url(post_id)),
            CommentServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<UserServiceError> for WebError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::NotFound => WebError::NotFound,
            UserServiceError::InternalError(e) => WebError::Internal(e),
            other => WebError::Internal(anyhow::anyhow!("Unhandled user error: {}", other)),
        }
    }
}

impl From<CategoryServiceError> for WebError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound(_) => WebError::NotFound,
            CategoryServiceError::InternalError(e) => WebError::Internal(e),
            other => WebError::Internal(anyhow::anyhow!("Unhandled category error: {}", other)),
        }
    }
}

impl From<LocationServiceError> for WebError {
    fn from(e: LocationServiceError) -> Self {
        match e {
            LocationServiceError::NotFound(_) => WebError::NotFound,
            LocationServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

/// Post moderation list
pub const ADMIN_POSTS_URL: &str = "/admin/posts/";

/// Post moderation list narrowed to one author
pub fn admin_posts_url(author: &str) -> String {
    format!("{}?author={}", ADMIN_POSTS_URL, urlencoding::encode(author))
}

/// Comment moderation list narrowed to one post
pub fn admin_comments_url(post_id: i64) -> String {
    format!("/admin/comments/?post={}", post_id)
}

/// Detail page of a post
pub fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Profile page of a user
pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}
