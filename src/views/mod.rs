//! Server-rendered HTML.
//!
//! Every page goes through [`RenderContext::render`], which wraps the page
//! body in the shared layout. The layout is where the implicit globals
//! `currentUser` and `messages` are consumed.

pub mod pages;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Html,
};
use serde::Serialize;
use std::fmt::Write;

use crate::auth::Principal;
use crate::error::AppError;
use crate::session::FlashMessage;

/// Per-request view globals, built by the view-context stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    pub title: String,
    #[serde(rename = "currentUser")]
    pub current_user: Option<Principal>,
    pub messages: Vec<FlashMessage>,
}

impl RenderContext {
    pub fn render(&self, page_title: &str, body: &str) -> Html<String> {
        Html(layout(self, page_title, body))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RenderContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RenderContext>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("Render context missing; view-context stage is not installed");
                AppError::internal_server_error("Page context unavailable")
            })
    }
}

fn layout(ctx: &RenderContext, page_title: &str, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} | {}</title>\n<link rel=\"stylesheet\" href=\"/stylesheets/style.css\">\n\
         </head>\n<body>\n<nav>\n<a href=\"/\" class=\"brand\">{}</a>\n\
         <a href=\"/gyms\">Gyms</a>\n<a href=\"/pools\">Pools</a>\n<a href=\"/rdv\">Rendezvous</a>\n",
        escape(page_title),
        escape(&ctx.title),
        escape(&ctx.title),
    );

    match &ctx.current_user {
        Some(user) => {
            let _ = write!(
                html,
                "<span class=\"current-user\">{}</span>\n<a href=\"/logout\">Log out</a>\n",
                escape(&user.username)
            );
        }
        None => html.push_str("<a href=\"/login\">Log in</a>\n<a href=\"/signup\">Sign up</a>\n"),
    }
    html.push_str("</nav>\n<main>\n");

    for message in &ctx.messages {
        let _ = writeln!(
            html,
            "<div class=\"flash flash-{}\">{}</div>",
            message.category.as_str(),
            escape(&message.text)
        );
    }

    html.push_str(body);
    html.push_str("\n</main>\n</body>\n</html>\n");
    html
}

/// Standalone page for error responses, which may be produced before any
/// render context exists
pub fn error_page(status: StatusCode, message: &str) -> String {
    let ctx = RenderContext {
        title: "SportsBuddies".to_string(),
        ..Default::default()
    };
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{} {}</h1>\n<p class=\"error-message\">{}</p>\n<a href=\"/\">Back home</a>",
        status.as_u16(),
        escape(reason),
        escape(message)
    );
    layout(&ctx, reason, &body)
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
