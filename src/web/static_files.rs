//! Embedded static assets and the health check

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_embed::RustEmbed;
use serde_json::json;

use crate::web::common::Path;
use crate::web::middleware::{AppState, WebError};

/// Stylesheets and images under `static/`
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// GET /static/{*path}
pub async fn serve_static(Path(path): Path<String>) -> Result<Response, WebError> {
    let file = StaticAssets::get(&path).ok_or(WebError::NotFound)?;

    Ok((
        [
            (header::CONTENT_TYPE, get_content_type(&path)),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        file.data.into_owned(),
    )
        .into_response())
}

fn get_content_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// GET /health - 200 when the database answers
pub async fn health(State(state): State<AppState>) -> Response {
    match state.pool.ping().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(get_content_type("css/style.css"), "text/css; charset=utf-8");
        assert_eq!(get_content_type("img/logo.SVG"), "image/svg+xml");
        assert_eq!(get_content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_stylesheet_is_embedded() {
        assert!(StaticAssets::get("css/style.css").is_some());
    }
}
