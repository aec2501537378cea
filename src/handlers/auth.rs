// handlers/auth.rs - Account creation, login and logout
//
// Every POST answers with a redirect; outcomes reach the user as flash
// messages rendered on the next page.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthError, AuthSession, Credentials, PRINCIPAL_KEY};
use crate::error::AppError;
use crate::middleware::Payload;
use crate::session::{FlashExt, FlashMessage, Session};
use crate::state::AppState;
use crate::views::{pages, RenderContext};

use super::required;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form))
        .route("/process-signup", post(process_signup))
        .route("/login", get(login_form))
        .route("/process-login", post(process_login))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET /signup
pub async fn signup_form(ctx: RenderContext) -> Html<String> {
    ctx.render("Sign up", &pages::signup_form())
}

/// POST /process-signup - Create the account and log it in
pub async fn process_signup(
    State(state): State<AppState>,
    mut auth_session: AuthSession,
    session: Session,
    Payload(form): Payload<SignupForm>,
) -> Result<Response, AppError> {
    let Some(username) = required(&form.username) else {
        session.flash(FlashMessage::error("Choose a username.")).await?;
        return Ok(Redirect::to("/signup").into_response());
    };
    if !form.email.contains('@') {
        session.flash(FlashMessage::error("Enter a valid email address.")).await?;
        return Ok(Redirect::to("/signup").into_response());
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        let message = format!("Passwords need at least {} characters.", MIN_PASSWORD_LEN);
        session.flash(FlashMessage::error(message)).await?;
        return Ok(Redirect::to("/signup").into_response());
    }

    match state
        .authenticator
        .register(&username, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            auth_session.login(&user).await?;
            let message = format!("Welcome, {}!", user.username);
            session.flash(FlashMessage::success(message)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ AuthError::EmailTaken(_)) => {
            session.flash(FlashMessage::error(e.to_string())).await?;
            Ok(Redirect::to("/signup").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_form(ctx: RenderContext) -> Html<String> {
    ctx.render("Log in", &pages::login_form())
}

/// POST /process-login - Check the email and password, then log in.
/// Accepts the HTML form or the same fields as JSON.
pub async fn process_login(
    mut auth_session: AuthSession,
    session: Session,
    Payload(credentials): Payload<Credentials>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.authenticate(credentials).await? else {
        session
            .flash(FlashMessage::error(AuthError::InvalidCredentials.to_string()))
            .await?;
        return Ok(Redirect::to("/login").into_response());
    };

    // Logging in rotates the session id
    auth_session.login(&user).await?;
    tracing::info!("User {} logged in", user.id);
    let message = format!("Welcome back, {}!", user.username);
    session.flash(FlashMessage::success(message)).await?;
    Ok(Redirect::to("/").into_response())
}

/// GET /logout
pub async fn logout(mut auth_session: AuthSession, session: Session) -> Result<Redirect, AppError> {
    if let Some(user) = auth_session.logout().await? {
        tracing::info!("User {} logged out", user.id);
    }
    session.remove::<Uuid>(PRINCIPAL_KEY).await?;
    session.flash(FlashMessage::info("You have been logged out.")).await?;
    Ok(Redirect::to("/"))
}
