use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use quad_events::{normalize, EventKind, EventView};
use quad_favourites::{resolve, FavouriteReference};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteEntry {
    pub item_type: String,
    pub item_id: Uuid,
    pub added_at: DateTime<Utc>,
    /// `null` when the target no longer resolves.
    pub item: Option<EventView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteBody {
    pub item_type: String,
    pub item_id: Uuid,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/favourites/{user_id}",
        get(list_favourites)
            .post(add_favourite)
            .delete(remove_favourite),
    )
}

fn authorize_user_scope(claims: &Claims, user_id: Uuid) -> Result<(), AppError> {
    if claims.sub == user_id || claims.role.is_staff() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "you may only access your own favourites".to_string(),
        ))
    }
}

/// GET /v1/favourites/{user_id}
/// The stored order is the display order; missing targets come back as null
/// items rather than holes.
async fn list_favourites(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<FavouriteEntry>>, AppError> {
    authorize_user_scope(&claims, user_id)?;
    let references = state.favourites.list_for_user(user_id).await?;
    let resolved = resolve(state.events.as_ref(), &references).await;

    let entries = resolved
        .into_iter()
        .map(|entry| FavouriteEntry {
            item: entry.item.as_ref().map(normalize),
            item_type: entry.item_type,
            item_id: entry.item_id,
            added_at: entry.added_at,
        })
        .collect();
    Ok(Json(entries))
}

async fn add_favourite(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<FavouriteBody>,
) -> Result<StatusCode, AppError> {
    authorize_user_scope(&claims, user_id)?;
    // New references must name a known kind; legacy stored ones may not.
    body.item_type.parse::<EventKind>().map_err(|_| {
        AppError::Validation(format!("itemType: unknown event kind '{}'", body.item_type))
    })?;

    let reference = FavouriteReference {
        item_type: body.item_type,
        item_id: body.item_id,
        added_at: Utc::now(),
    };
    state.favourites.add(user_id, &reference).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_favourite(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<FavouriteBody>,
) -> Result<StatusCode, AppError> {
    authorize_user_scope(&claims, user_id)?;
    let removed = state
        .favourites
        .remove(user_id, &body.item_type, body.item_id)
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("favourite not found".to_string()))
    }
}
