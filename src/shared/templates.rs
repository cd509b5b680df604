//! Mail body templates using Jinja2 syntax.
//!
//! Templates live in `templates/mail/` and are compiled into the binary, so a
//! deployment only needs the executable. Names ending in `.html.jinja` are
//! HTML auto-escaped; `.txt.jinja` templates render verbatim.

use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::error::AppError;

/// HTML notification sent to the municipal contact on every submission
pub const REPORT_NOTIFICATION: &str = "mail/report_notification.html.jinja";

/// Plain-text body pre-filled in the admin's reply form
pub const REPLY_BODY: &str = "mail/reply_body.txt.jinja";

const EMBEDDED: &[(&str, &str)] = &[
    (
        REPORT_NOTIFICATION,
        include_str!("../../templates/mail/report_notification.html.jinja"),
    ),
    (
        REPLY_BODY,
        include_str!("../../templates/mail/reply_body.txt.jinja"),
    ),
];

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in EMBEDDED {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with any serializable context.
///
/// # Example
/// ```ignore
/// let body = render(REPLY_BODY, minijinja::context! { user_name => "Taro Yamada" })?;
/// ```
pub fn render<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_missing_template() {
        let result = render("mail/nope.txt.jinja", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_html_template_escapes() {
        let html = render(
            REPORT_NOTIFICATION,
            context! {
                report => context! {
                    report_number => "20240521001",
                    user_name => "<script>",
                    tail_submitted => true,
                },
                sex_label => "Male",
                photo_count => 2,
                sender_name => "Chair",
            },
        )
        .unwrap();

        assert!(html.contains("20240521001"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("submitted"));
    }

    #[test]
    fn test_text_template_is_verbatim() {
        let body = render(
            REPLY_BODY,
            context! {
                user_name => "Taro & Sons",
                report => context! { report_number => "20240521001" },
                sex_label => "Female",
                sender_name => "Chair",
            },
        )
        .unwrap();

        assert!(body.starts_with("Dear Taro & Sons,"));
        assert!(body.contains("20240521001"));
    }
}
