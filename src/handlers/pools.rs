// handlers/pools.rs - Pool listing, creation and removal

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::database::models::PoolDraft;
use crate::error::AppError;
use crate::middleware::{CurrentUser, Payload};
use crate::session::{FlashExt, FlashMessage, Session};
use crate::state::AppState;
use crate::views::{pages, RenderContext};

use super::{parse_id, required};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list))
        .route("/pools/add", get(add_form))
        .route("/process-pool", post(process))
        .route("/pools/:id", get(show))
        .route("/pools/:id/delete", post(delete))
}

/// Numbers stay text until validated so a bad value becomes a flash
/// message rather than an extractor rejection
#[derive(Debug, Deserialize)]
pub struct PoolForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub length_m: String,
    #[serde(default)]
    pub lanes: String,
}

fn positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// GET /pools
pub async fn list(
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let pools = state.pools.select_any().await?;
    Ok(ctx.render("Pools", &pages::pool_list(&pools, ctx.current_user.is_some())))
}

/// GET /pools/add
pub async fn add_form(_user: CurrentUser, ctx: RenderContext) -> Html<String> {
    ctx.render("Add a pool", &pages::pool_form())
}

/// POST /process-pool
pub async fn process(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Payload(form): Payload<PoolForm>,
) -> Result<Response, AppError> {
    let (Some(name), Some(address), Some(city)) = (
        required(&form.name),
        required(&form.address),
        required(&form.city),
    ) else {
        session.flash(FlashMessage::error("Name, address and city are required.")).await?;
        return Ok(Redirect::to("/pools/add").into_response());
    };

    let (Some(length_m), Some(lanes)) = (positive(&form.length_m), positive(&form.lanes)) else {
        session.flash(FlashMessage::error("Length and lanes must be positive whole numbers.")).await?;
        return Ok(Redirect::to("/pools/add").into_response());
    };

    let pool = state
        .pools
        .insert(&PoolDraft {
            name,
            address,
            city,
            length_m,
            lanes,
            owner_id: user.id,
        })
        .await?;

    tracing::info!("User {} added pool {} ({})", user.id, pool.name, pool.id);
    session.flash(FlashMessage::success(format!("{} was added.", pool.name))).await?;
    Ok(Redirect::to(&format!("/pools/{}", pool.id)).into_response())
}

/// GET /pools/:id
pub async fn show(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let pool = state.pools.select_404(parse_id(&id, "pool")?).await?;
    let is_owner = ctx.current_user.as_ref().is_some_and(|u| u.id == pool.owner_id);
    Ok(ctx.render(&pool.name, &pages::pool_detail(&pool, is_owner)))
}

/// POST /pools/:id/delete - Owner only
pub async fn delete(
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let pool = state.pools.select_404(parse_id(&id, "pool")?).await?;

    if pool.owner_id != user.id {
        session.flash(FlashMessage::error("Only the person who added this pool can remove it.")).await?;
        return Ok(Redirect::to(&format!("/pools/{}", pool.id)).into_response());
    }

    state.pools.delete(pool.id).await?;
    tracing::info!("User {} removed pool {}", user.id, pool.id);
    session.flash(FlashMessage::success(format!("{} was removed.", pool.name))).await?;
    Ok(Redirect::to("/pools").into_response())
}

#[cfg(test)]
mod tests {
    use super::positive;

    #[test]
    fn positive_rejects_zero_and_garbage() {
        assert_eq!(positive(" 25 "), Some(25));
        assert_eq!(positive("0"), None);
        assert_eq!(positive("-3"), None);
        assert_eq!(positive("fifty"), None);
    }
}
