use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use quad_core::identity::Role;
use quad_events::enrollment::{self, NewRegistration};
use quad_events::{normalize, Event, EventKind, EventView};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{require_role, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: u8,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", get(list_events).post(create_event))
        .route("/v1/events/{kind}/{id}", get(get_event))
        .route("/v1/events/{kind}/{id}/register", post(register))
        .route("/v1/events/{kind}/{id}/pay", post(confirm_payment))
        .route("/v1/events/{kind}/{id}/rate", post(rate))
        .route("/v1/events/{kind}/{id}/comment", post(comment))
        .route("/v1/events/{kind}/{id}/archive", post(archive))
}

fn parse_kind(raw: &str) -> Result<EventKind, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("unknown event kind '{raw}'")))
}

/// GET /v1/events?type=trip
/// Normalized projections for the cards view; omitting `type` walks every
/// collection (one query per kind).
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventView>>, AppError> {
    let kinds = match query.kind.as_deref() {
        Some(raw) => vec![parse_kind(raw)?],
        None => EventKind::ALL.to_vec(),
    };

    let mut views = Vec::new();
    for kind in kinds {
        let events = state.events.list(kind, query.include_archived).await?;
        views.extend(events.iter().map(normalize));
    }
    Ok(Json(views))
}

async fn get_event(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<EventView>, AppError> {
    let kind = parse_kind(&kind)?;
    let event = load_event(&state, kind, id).await?;
    Ok(Json(normalize(&event)))
}

/// POST /v1/events
/// Events-office only; the body is tagged with the event kind.
async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(event): Json<Event>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::EventsOffice, Role::Admin])?;
    if event.name().trim().is_empty() {
        return Err(AppError::Validation(
            "name: must not be blank".to_string(),
        ));
    }
    if matches!(event, Event::Booth(_)) {
        // Booths are only created by approving a vendor request.
        return Err(AppError::Validation(
            "type: booths are created through vendor requests".to_string(),
        ));
    }
    state.events.insert(&event).await?;
    Ok(Json(normalize(&event)))
}

async fn register(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Extension(claims): Extension<Claims>,
    body: Option<Json<RegisterRequest>>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::Student])?;
    let kind = parse_kind(&kind)?;
    let mut event = load_event(&state, kind, id).await?;

    let name = body
        .and_then(|Json(b)| b.name)
        .unwrap_or_else(|| claims.email.clone());
    enrollment::register(
        &mut event,
        NewRegistration {
            user: claims.sub,
            name,
            email: claims.email.clone(),
        },
        Utc::now().date_naive(),
    )?;

    state.events.replace(&event).await?;
    Ok(Json(normalize(&event)))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::Student])?;
    let kind = parse_kind(&kind)?;
    let mut event = load_event(&state, kind, id).await?;
    enrollment::confirm_payment(&mut event, claims.sub)?;
    state.events.replace(&event).await?;
    Ok(Json(normalize(&event)))
}

async fn rate(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RateRequest>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::Student])?;
    let kind = parse_kind(&kind)?;
    let mut event = load_event(&state, kind, id).await?;
    enrollment::rate(&mut event, claims.sub, body.score)?;
    state.events.replace(&event).await?;
    Ok(Json(normalize(&event)))
}

async fn comment(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::Student])?;
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("text: must not be blank".to_string()));
    }
    let kind = parse_kind(&kind)?;
    let mut event = load_event(&state, kind, id).await?;
    enrollment::comment(&mut event, claims.sub, body.text)?;
    state.events.replace(&event).await?;
    Ok(Json(normalize(&event)))
}

/// Past events are archived, never hard-deleted.
async fn archive(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EventView>, AppError> {
    require_role(&claims, &[Role::EventsOffice, Role::Admin])?;
    let kind = parse_kind(&kind)?;
    let mut event = load_event(&state, kind, id).await?;
    event.set_archived(true);
    state.events.replace(&event).await?;
    Ok(Json(normalize(&event)))
}

async fn load_event(state: &AppState, kind: EventKind, id: Uuid) -> Result<Event, AppError> {
    state
        .events
        .get(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{kind} {id} not found")))
}
