//! Template engine
//!
//! HTML pages are rendered with Tera. Templates live in `templates/` and are
//! embedded into the binary with rust-embed, so a release build needs no
//! files next to it. Every page gets the same set of standard variables
//! (site name, signed-in user, request path, year).

use anyhow::Result;
use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::models::User;

mod error;

pub use error::ThemeError;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct Templates;

/// Tera wrapper holding every embedded template
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Parse all embedded templates
    pub fn new() -> Result<Self> {
        let mut templates = Vec::new();
        for name in Templates::iter() {
            let Some(file) = Templates::get(&name) else {
                continue;
            };
            let content = String::from_utf8(file.data.into_owned()).map_err(|e| {
                ThemeError::InvalidTemplate {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            templates.push((name.to_string(), content));
        }

        let mut tera = Tera::default();
        // add_raw_templates resolves inheritance across the whole set at once
        tera.add_raw_templates(templates).map_err(|e| ThemeError::InvalidTemplate {
            name: "templates/".to_string(),
            reason: describe(&e),
        })?;
        tera.autoescape_on(vec![".html"]);

        tracing::debug!("Loaded {} templates", tera.get_template_names().count());
        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| ThemeError::TemplateError(format!("Failed to render '{}': {}", template, describe(&e))).into())
    }

    /// Render with the standard variables added to `context`
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();
        full_context.insert("site_name", &standard_vars.site_name);
        full_context.insert("site_description", &standard_vars.site_description);
        full_context.insert("request_path", &standard_vars.request_path);
        full_context.insert("year", &standard_vars.year);
        if let Some(ref user) = standard_vars.current_user {
            full_context.insert("current_user", user);
        }

        self.render(template, &full_context)
    }

    /// Last-resort page used when even the error templates fail
    pub fn simple_error_page(status: u16, message: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{status}</title></head>
<body><h1>{status}</h1><p>{message}</p></body>
</html>"#
        )
    }
}

fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Variables available to every template
#[derive(Debug, Clone, Serialize)]
pub struct StandardTemplateVars {
    pub site_name: String,
    pub site_description: String,
    /// Signed-in user, if any
    pub current_user: Option<CurrentUserVars>,
    pub request_path: String,
    /// Current year (for the footer)
    pub year: i32,
}

/// The signed-in user as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserVars {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl From<&User> for CurrentUserVars {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_superuser: user.is_superuser,
        }
    }
}

impl StandardTemplateVars {
    pub fn new(
        site_name: impl Into<String>,
        site_description: impl Into<String>,
        request_path: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            site_description: site_description.into(),
            current_user: None,
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
        }
    }

    /// Set the current user
    pub fn with_user(mut self, user: Option<&User>) -> Self {
        self.current_user = user.map(CurrentUserVars::from);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let engine = TemplateEngine::new().unwrap();
        for name in [
            "base.html",
            "blog/index.html",
            "blog/detail.html",
            "blog/create.html",
            "blog/comment.html",
            "blog/profile.html",
            "blog/user.html",
            "blog/category.html",
            "registration/login.html",
            "registration/registration_form.html",
            "admin/categories.html",
            "admin/locations.html",
            "admin/posts.html",
            "admin/comments.html",
            "errors/400.html",
            "errors/403.html",
            "errors/404.html",
            "errors/500.html",
        ] {
            assert!(
                engine.tera.get_template_names().any(|n| n == name),
                "missing {name}"
            );
        }
    }

    #[test]
    fn test_standard_vars_are_injected() {
        let engine = TemplateEngine::new().unwrap();
        let user = User::new("alice".into(), "a@example.com".into(), "h".into(), false);
        let vars = StandardTemplateVars::new("Blogicum", "desc", "/missing/").with_user(Some(&user));

        let html = engine
            .render_with_standard_vars("errors/404.html", &TeraContext::new(), &vars)
            .unwrap();
        assert!(html.contains("Blogicum"));
        assert!(html.contains("alice"));
    }

    #[test]
    fn test_output_is_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let vars = StandardTemplateVars::new("<b>site</b>", "", "/");
        let html = engine
            .render_with_standard_vars("errors/404.html", &TeraContext::new(), &vars)
            .unwrap();
        assert!(html.contains("&lt;b&gt;site&lt;&#x2F;b&gt;"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope.html", &TeraContext::new()).is_err());
    }
}
