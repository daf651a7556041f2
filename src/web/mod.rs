//! Web layer - HTML pages and routing
//!
//! Server-rendered pages:
//! - Public listings (index, category, profile) and post detail
//! - Post and comment create/edit/delete for signed-in users
//! - Registration, login, logout
//! - Category, location, post and comment administration for superusers
//! - Embedded static assets and `/health`

pub mod admin;
pub mod auth;
pub mod comments;
pub mod common;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod static_files;

use axum::{middleware as axum_middleware, routing::get, routing::post, Router};

pub use middleware::{AppState, CurrentUser, RequireSuperuser, RequireUser, WebError};

/// Page routes, without middleware
pub fn build_page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index))
        .route("/posts/create/", get(posts::create_form).post(posts::create_post))
        .route("/posts/{id}/", get(posts::post_detail))
        .route("/posts/{id}/edit/", get(posts::edit_form).post(posts::edit_post))
        .route("/posts/{id}/delete/", get(posts::delete_form).post(posts::delete_post))
        .route("/posts/{id}/comment/", post(comments::add_comment))
        .route(
            "/posts/{id}/comment/{cid}/edit/",
            get(comments::edit_form).post(comments::edit_comment),
        )
        .route(
            "/posts/{id}/comment/{cid}/delete/",
            get(comments::delete_form).post(comments::delete_comment),
        )
        .route("/category/{slug}/", get(posts::category_posts))
        .route("/profile/{username}/", get(profile::profile))
        .route(
            "/profile/{username}/edit/",
            get(profile::edit_form).post(profile::edit_profile),
        )
        .route(
            "/auth/registration/",
            get(auth::registration_form).post(auth::register),
        )
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/logout/", post(auth::logout))
        .route(
            "/admin/categories/",
            get(admin::categories).post(admin::create_category),
        )
        .route("/admin/categories/{id}/", post(admin::update_category))
        .route(
            "/admin/locations/",
            get(admin::locations).post(admin::create_location),
        )
        .route("/admin/locations/{id}/", post(admin::update_location))
        .route("/admin/posts/", get(admin::posts))
        .route("/admin/posts/{id}/", post(admin::moderate_post))
        .route("/admin/comments/", get(admin::comments))
        .route("/static/{*path}", get(static_files::serve_static))
        .route("/health", get(static_files::health))
}

/// Build the complete router with session and error-page middleware
pub fn build_router(state: AppState) -> Router {
    build_page_router()
        .fallback(middleware::not_found)
        // Runs inside optional_auth so error pages know the user
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .with_state(state)
}
