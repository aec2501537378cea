mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn login_accepts_a_json_body() -> Result<()> {
    let app = TestApp::new()?;
    app.register("ana", "ana@example.com").await?;

    let res = app
        .post_json(
            "/process-login",
            json!({ "email": "ana@example.com", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));

    let home = app.follow(&res).await?;
    assert!(home.body.contains("<span class=\"current-user\">ana</span>"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected_and_the_session_survives() -> Result<()> {
    let app = TestApp::new()?;
    app.register("ana", "ana@example.com").await?;

    app.get("/").await?;
    let cookie = app.session_cookie().unwrap();

    let res = app
        .post_raw("/process-login", "application/json", "{\"email\": ")
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.sessions.len(), 1);

    // Same session, still usable
    let res = app.get("/gyms").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.session_cookie().unwrap(), cookie);

    app.login("ana@example.com").await?;
    Ok(())
}

#[tokio::test]
async fn malformed_form_is_a_client_error() -> Result<()> {
    let app = TestApp::new()?;
    app.register("ana", "ana@example.com").await?;
    app.login("ana@example.com").await?;

    // No password field at all
    let res = app
        .post_raw("/process-login", "application/x-www-form-urlencoded", "email=ana%40example.com")
        .await?;
    assert!(res.status.is_client_error(), "got {}", res.status);

    let res = app.get("/").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("<span class=\"current-user\">ana</span>"));
    Ok(())
}

#[tokio::test]
async fn unsupported_content_type_is_415() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post_raw("/process-login", "text/plain", "email=ana@example.com")
        .await?;
    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let res = app.get("/").await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_413() -> Result<()> {
    let app = TestApp::with_env(&[("BODY_LIMIT_BYTES", "64")])?;

    let res = app
        .post_json(
            "/process-login",
            json!({ "email": "a".repeat(200), "password": PASSWORD }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn garbled_cookie_header_starts_a_fresh_session() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .get_with_cookie_header("/", "=;;; sportsbuddies.sid=%%not-signed%%; junk")
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.sets_session_cookie());
    assert_eq!(app.sessions.len(), 1);
    Ok(())
}
