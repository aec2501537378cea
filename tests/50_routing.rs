mod common;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use common::TestApp;
use sportsbuddies::app::build_app_with;
use sportsbuddies::handlers::MountTable;
use sportsbuddies::pipeline::{Pipeline, PipelineError, PipelineStage};
use sportsbuddies::AppState;

fn first() -> Router<AppState> {
    Router::new()
        .route("/shared", get(|| async { "first" }))
        .route("/only-first", get(|| async { "only first" }))
}

fn second() -> Router<AppState> {
    Router::new()
        .route("/shared", get(|| async { "second" }))
        .route("/only-second", get(|| async { "only second" }))
}

#[tokio::test]
async fn earlier_mount_wins_on_collision() -> Result<()> {
    let app = TestApp::new()?;
    let mounts = MountTable::new().mount("first", first()).mount("second", second());
    let router = build_app_with(app.state.clone(), &Pipeline::standard(), mounts);
    let app = app.with_router(router);

    assert_eq!(app.get("/shared").await?.body, "first");
    assert_eq!(app.get("/only-first").await?.body, "only first");
    assert_eq!(app.get("/only-second").await?.body, "only second");

    let missing = app.get("/neither").await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Page not found"));
    Ok(())
}

#[tokio::test]
async fn mount_order_is_swappable() -> Result<()> {
    let app = TestApp::new()?;
    let mounts = MountTable::new().mount("second", second()).mount("first", first());
    let router = build_app_with(app.state.clone(), &Pipeline::standard(), mounts);
    let app = app.with_router(router);

    assert_eq!(app.get("/shared").await?.body, "second");
    Ok(())
}

#[tokio::test]
async fn method_mismatch_falls_through_to_later_mounts() -> Result<()> {
    let app = TestApp::new()?;
    let mounts = MountTable::new()
        .mount("reader", Router::new().route("/x", get(|| async { "read" })))
        .mount("writer", Router::new().route("/x", post(|| async { "written" })));
    let router = build_app_with(app.state.clone(), &Pipeline::standard(), mounts);
    let app = app.with_router(router);

    assert_eq!(app.get("/x").await?.body, "read");

    let res = app.post_form("/x", &[]).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "written");

    // Nobody answers DELETE: the 404 page, not a 405
    let res = app.send(axum::http::Method::DELETE, "/x", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[test]
fn standard_mount_order() {
    assert_eq!(
        MountTable::standard().names(),
        vec!["index", "auth", "gyms", "pools", "rdv"]
    );
}

#[test]
fn misordered_pipeline_is_rejected_before_serving() {
    use PipelineStage::*;

    let err = Pipeline::from_stages(vec![
        RequestLogger,
        BodyParser,
        Session,
        CookieParser,
        Authentication,
        FlashRelay,
        ViewContext,
    ])
    .unwrap_err();
    assert_eq!(
        err,
        PipelineError::OutOfOrder {
            stage: Session,
            requires: CookieParser
        }
    );
}

#[tokio::test]
async fn reduced_pipeline_still_serves_static_files() -> Result<()> {
    use PipelineStage::*;

    let app = TestApp::new()?;
    let pipeline = Pipeline::from_stages(vec![RequestLogger, StaticAssets])?;
    let mounts = MountTable::new().mount("first", first());
    let router = build_app_with(app.state.clone(), &pipeline, mounts);
    let app = app.with_router(router);

    assert_eq!(app.get("/stylesheets/style.css").await?.status, StatusCode::OK);
    let res = app.get("/shared").await?;
    assert_eq!(res.body, "first");
    assert!(!res.sets_session_cookie());
    Ok(())
}
