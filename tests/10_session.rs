mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, COOKIE_NAME};
use sportsbuddies::session::spawn_expired_deletion;
use std::time::Duration;
use tower_sessions::ExpiredDeletion;

#[tokio::test]
async fn first_visit_creates_session_and_signed_cookie() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.sets_session_cookie(), "no session cookie in {:?}", res.set_cookies);

    let cookie = res
        .set_cookies
        .iter()
        .find(|c| c.starts_with(&format!("{}=", COOKIE_NAME)))
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age="));
    assert!(!cookie.contains("Secure"), "development preset must not mark cookies Secure");

    assert_eq!(app.sessions.len(), 1);
    Ok(())
}

#[tokio::test]
async fn valid_cookie_resumes_the_same_session() -> Result<()> {
    let app = TestApp::new()?;

    app.get("/").await?;
    let res = app.get("/gyms").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.sets_session_cookie(), "cookie is refreshed on every response");
    assert_eq!(app.sessions.len(), 1);
    Ok(())
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_absent() -> Result<()> {
    let app = TestApp::new()?;
    app.get("/").await?;

    app.set_session_cookie("forged-session-id");
    let res = app.get("/").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.sessions.len(), 2, "a forged id must start a fresh session");
    Ok(())
}

#[tokio::test]
async fn cookie_is_set_on_error_responses_too() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/no/such/page").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.sets_session_cookie());
    assert_eq!(app.sessions.len(), 1);
    Ok(())
}

#[tokio::test]
async fn login_rotates_the_session_id() -> Result<()> {
    let app = TestApp::new()?;
    app.register("ana", "ana@example.com").await?;

    app.get("/login").await?;
    let before = app.session_cookie().unwrap();

    app.login("ana@example.com").await?;
    let after = app.session_cookie().unwrap();

    assert_ne!(before, after);
    assert_eq!(app.sessions.len(), 1, "the pre-login session must be destroyed");
    Ok(())
}

#[tokio::test]
async fn production_preset_marks_cookie_secure() -> Result<()> {
    let app = TestApp::with_env(&[("APP_ENV", "production")])?;

    let res = app.get("/").await?;
    assert!(res
        .set_cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", COOKIE_NAME)) && c.contains("Secure")));
    Ok(())
}

#[tokio::test]
async fn expired_sessions_are_purged() -> Result<()> {
    let app = TestApp::with_env(&[("SESSION_TTL_SECS", "0")])?;

    for _ in 0..50 {
        app.forget_cookies();
        let res = app.get("/").await?;
        assert_eq!(res.status, StatusCode::OK);
    }
    assert_eq!(app.sessions.len(), 50);

    app.sessions.delete_expired().await?;
    assert_eq!(app.sessions.len(), 0);
    Ok(())
}

#[tokio::test]
async fn sweeper_task_empties_the_store() -> Result<()> {
    let app = TestApp::with_env(&[("SESSION_TTL_SECS", "0")])?;
    for _ in 0..5 {
        app.forget_cookies();
        app.get("/gyms").await?;
    }

    let sweeper = spawn_expired_deletion(app.sessions.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    sweeper.abort();

    assert!(app.sessions.is_empty());
    Ok(())
}

#[tokio::test]
async fn health_check_opens_no_session() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/health").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"memory\""));
    assert!(!res.sets_session_cookie());
    assert!(app.sessions.is_empty());
    Ok(())
}
