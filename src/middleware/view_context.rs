use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthState;
use crate::middleware::flash::FlashMessages;
use crate::state::AppState;
use crate::views::RenderContext;

/// Expose `currentUser` and `messages` to every render of this request
pub async fn view_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current_user = request
        .extensions()
        .get::<AuthState>()
        .and_then(|auth| auth.current_user().cloned());

    let messages = request
        .extensions()
        .get::<FlashMessages>()
        .map(|flash| flash.0.clone())
        .unwrap_or_default();

    request.extensions_mut().insert(RenderContext {
        title: state.config.server.title.clone(),
        current_user,
        messages,
    });

    next.run(request).await
}
