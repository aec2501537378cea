// handlers/rdv.rs - Sports rendezvous at a gym or pool

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{RdvDraft, Venue, VenueKind};
use crate::error::AppError;
use crate::middleware::{CurrentUser, Payload};
use crate::session::{FlashExt, FlashMessage, Session};
use crate::state::AppState;
use crate::views::{pages, RenderContext};

use super::{parse_id, required};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rdv", get(list))
        .route("/rdv/add", get(add_form))
        .route("/process-rdv", post(process))
        .route("/rdv/:id", get(show))
        .route("/rdv/:id/join", post(join))
        .route("/rdv/:id/delete", post(delete))
}

#[derive(Debug, Deserialize)]
pub struct RdvForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sport: String,
    /// `gym:<id>` or `pool:<id>`
    #[serde(default)]
    pub venue: String,
    /// `datetime-local` input, interpreted as UTC
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub description: String,
}

pub fn parse_venue(raw: &str) -> Option<Venue> {
    let (kind, id) = raw.split_once(':')?;
    Some(Venue {
        kind: VenueKind::parse(kind)?,
        id: Uuid::parse_str(id).ok()?,
    })
}

pub fn parse_starts_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

async fn venue_name(state: &AppState, venue: Venue) -> Result<Option<String>, AppError> {
    let name = match venue.kind {
        VenueKind::Gym => state.gyms.select_one(venue.id).await?.map(|g| g.name),
        VenueKind::Pool => state.pools.select_one(venue.id).await?.map(|p| p.name),
    };
    Ok(name)
}

/// GET /rdv - Soonest first
pub async fn list(
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let mut rdvs = state.rdvs.select_any().await?;
    rdvs.sort_by_key(|rdv| rdv.starts_at);
    Ok(ctx.render("Rendezvous", &pages::rdv_list(&rdvs, ctx.current_user.is_some())))
}

/// GET /rdv/add
pub async fn add_form(
    _user: CurrentUser,
    State(state): State<AppState>,
    session: Session,
    ctx: RenderContext,
) -> Result<Response, AppError> {
    let gyms = state.gyms.select_any().await?;
    let pools = state.pools.select_any().await?;

    if gyms.is_empty() && pools.is_empty() {
        session.flash(FlashMessage::info("Add a gym or a pool before organizing a rendezvous.")).await?;
        return Ok(Redirect::to("/gyms/add").into_response());
    }

    Ok(ctx
        .render("Organize a rendezvous", &pages::rdv_form(&gyms, &pools))
        .into_response())
}

/// POST /process-rdv
pub async fn process(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    Payload(form): Payload<RdvForm>,
) -> Result<Response, AppError> {
    let back = || -> Result<Response, AppError> { Ok(Redirect::to("/rdv/add").into_response()) };

    let (Some(title), Some(sport)) = (required(&form.title), required(&form.sport)) else {
        session.flash(FlashMessage::error("Title and sport are required.")).await?;
        return back();
    };

    let Some(venue) = parse_venue(&form.venue) else {
        session.flash(FlashMessage::error("Pick a gym or a pool.")).await?;
        return back();
    };
    if venue_name(&state, venue).await?.is_none() {
        session.flash(FlashMessage::error("That venue no longer exists.")).await?;
        return back();
    }

    let Some(starts_at) = parse_starts_at(&form.starts_at) else {
        session.flash(FlashMessage::error("Enter a valid date and time.")).await?;
        return back();
    };
    if starts_at <= Utc::now() {
        session.flash(FlashMessage::error("A rendezvous has to be in the future.")).await?;
        return back();
    }

    let rdv = state
        .rdvs
        .insert(&RdvDraft {
            title,
            sport,
            venue,
            starts_at,
            description: form.description.trim().to_string(),
            organizer_id: user.id,
            participants: Vec::new(),
        })
        .await?;

    tracing::info!("User {} organized rendezvous {}", user.id, rdv.id);
    session.flash(FlashMessage::success(format!("{} is on the calendar.", rdv.title))).await?;
    Ok(Redirect::to(&format!("/rdv/{}", rdv.id)).into_response())
}

/// GET /rdv/:id
pub async fn show(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let rdv = state.rdvs.select_404(parse_id(&id, "rendezvous")?).await?;
    let venue = venue_name(&state, rdv.venue)
        .await?
        .unwrap_or_else(|| "a removed venue".to_string());

    let viewer = ctx.current_user.as_ref().map(|u| u.id);
    let can_join = viewer.is_some_and(|id| !rdv.has_participant(id));
    let is_organizer = viewer == Some(rdv.organizer_id);

    Ok(ctx.render(&rdv.title, &pages::rdv_detail(&rdv, &venue, can_join, is_organizer)))
}

/// POST /rdv/:id/join
pub async fn join(
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mut rdv = state.rdvs.select_404(parse_id(&id, "rendezvous")?).await?;

    if rdv.join(user.id) {
        let rdv = state.rdvs.update(&rdv).await?;
        tracing::info!("User {} joined rendezvous {}", user.id, rdv.id);
        session.flash(FlashMessage::success(format!("You joined {}.", rdv.title))).await?;
    } else {
        session.flash(FlashMessage::info("You are already part of this rendezvous.")).await?;
    }

    Ok(Redirect::to(&format!("/rdv/{}", rdv.id)).into_response())
}

/// POST /rdv/:id/delete - Organizer only
pub async fn delete(
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let rdv = state.rdvs.select_404(parse_id(&id, "rendezvous")?).await?;

    if rdv.organizer_id != user.id {
        session.flash(FlashMessage::error("Only the organizer can cancel this rendezvous.")).await?;
        return Ok(Redirect::to(&format!("/rdv/{}", rdv.id)).into_response());
    }

    state.rdvs.delete(rdv.id).await?;
    tracing::info!("User {} cancelled rendezvous {}", user.id, rdv.id);
    session.flash(FlashMessage::success(format!("{} was cancelled.", rdv.title))).await?;
    Ok(Redirect::to("/rdv").into_response())
}
