// handlers/mod.rs - Routers and the order they are mounted in
//
// Each router owns its own set of paths. They are consulted in mount order
// (index, auth, gyms, pools, rdv) and the first one with a matching path and
// method answers; anything left over gets the 404 page.

pub mod auth;
pub mod gyms;
pub mod index;
pub mod pools;
pub mod rdv;

use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::views::{pages, RenderContext};

/// A named router waiting to be mounted at the root path
pub struct Mount {
    pub name: &'static str,
    router: Router<AppState>,
}

/// Routers in precedence order.
///
/// Unlike `Router::merge`, overlapping paths do not panic: every router's
/// fallback is the next router in the table, so an earlier mount shadows a
/// later one for the routes they share. A path an earlier router knows
/// under another method also falls through rather than answering 405.
#[derive(Default)]
pub struct MountTable {
    mounts: Vec<Mount>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        Self::new()
            .mount("index", index::routes())
            .mount("auth", auth::routes())
            .mount("gyms", gyms::routes())
            .mount("pools", pools::routes())
            .mount("rdv", rdv::routes())
    }

    pub fn mount(mut self, name: &'static str, router: Router<AppState>) -> Self {
        self.mounts.push(Mount { name, router });
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.mounts.iter().map(|m| m.name).collect()
    }

    /// Collapse the table into one router, built from the last mount
    /// backwards so each router falls through to its successor.
    pub fn into_router(self, state: AppState) -> Router {
        let terminal = Router::new().fallback(not_found).with_state(state.clone());

        self.mounts.into_iter().rev().fold(terminal, |next, mount| {
            tracing::trace!("Mounting router '{}'", mount.name);
            let fallthrough = next.clone();
            mount
                .router
                .with_state(state.clone())
                .method_not_allowed_fallback(move |request: Request| {
                    let next = fallthrough.clone();
                    async move {
                        match next.oneshot(request).await {
                            Ok(response) => response,
                            Err(never) => match never {},
                        }
                    }
                })
                .fallback_service(next)
        })
    }
}

async fn not_found(ctx: RenderContext, uri: Uri) -> impl IntoResponse {
    tracing::debug!("No route for {}", uri.path());
    let Html(body) = ctx.render("Not found", &pages::not_found(uri.path()));
    (StatusCode::NOT_FOUND, Html(body))
}

/// Ids arrive as path text; anything that is not a UUID cannot name a record
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(format!("No such {}", what)))
}

/// Form text with surrounding whitespace removed; `None` when nothing is left
pub(crate) fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
