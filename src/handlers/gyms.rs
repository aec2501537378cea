// handlers/gyms.rs - Gym listing, creation and removal

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::database::models::GymDraft;
use crate::error::AppError;
use crate::middleware::{CurrentUser, Payload};
use crate::session::{FlashExt, FlashMessage, Session};
use crate::state::AppState;
use crate::views::{pages, RenderContext};

use super::{parse_id, required};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gyms", get(list))
        .route("/gyms/add", get(add_form))
        .route("/process-gym", post(process))
        .route("/gyms/:id", get(show))
        .route("/gyms/:id/delete", post(delete))
}

#[derive(Debug, Deserialize)]
pub struct GymForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub description: String,
}

/// GET /gyms
pub async fn list(
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let gyms = state.gyms.select_any().await?;
    Ok(ctx.render("Gyms", &pages::gym_list(&gyms, ctx.current_user.is_some())))
}

/// GET /gyms/add
pub async fn add_form(_user: CurrentUser, ctx: RenderContext) -> Html<String> {
    ctx.render("Add a gym", &pages::gym_form())
}

/// POST /process-gym
pub async fn process(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Payload(form): Payload<GymForm>,
) -> Result<Response, AppError> {
    let (Some(name), Some(address), Some(city)) = (
        required(&form.name),
        required(&form.address),
        required(&form.city),
    ) else {
        session.flash(FlashMessage::error("Name, address and city are required.")).await?;
        return Ok(Redirect::to("/gyms/add").into_response());
    };

    let gym = state
        .gyms
        .insert(&GymDraft {
            name,
            address,
            city,
            description: form.description.trim().to_string(),
            owner_id: user.id,
        })
        .await?;

    tracing::info!("User {} added gym {} ({})", user.id, gym.name, gym.id);
    session.flash(FlashMessage::success(format!("{} was added.", gym.name))).await?;
    Ok(Redirect::to(&format!("/gyms/{}", gym.id)).into_response())
}

/// GET /gyms/:id
pub async fn show(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let gym = state.gyms.select_404(parse_id(&id, "gym")?).await?;
    let is_owner = ctx.current_user.as_ref().is_some_and(|u| u.id == gym.owner_id);
    Ok(ctx.render(&gym.name, &pages::gym_detail(&gym, is_owner)))
}

/// POST /gyms/:id/delete - Owner only
pub async fn delete(
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let gym = state.gyms.select_404(parse_id(&id, "gym")?).await?;

    if gym.owner_id != user.id {
        session.flash(FlashMessage::error("Only the person who added this gym can remove it.")).await?;
        return Ok(Redirect::to(&format!("/gyms/{}", gym.id)).into_response());
    }

    state.gyms.delete(gym.id).await?;
    tracing::info!("User {} removed gym {}", user.id, gym.id);
    session.flash(FlashMessage::success(format!("{} was removed.", gym.name))).await?;
    Ok(Redirect::to("/gyms").into_response())
}
