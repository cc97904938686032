use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use quad_core::identity::Role;
use quad_events::{BoothSize, EventKind};
use quad_vendor::{CancelOrigin, RequestStatus, VendorRequest, MAX_PEOPLE};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{require_role, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorRequestBody {
    pub people: Vec<String>,
    pub booth_size: BoothSize,
    #[serde(default)]
    pub is_bazar_booth: bool,
    #[serde(default)]
    pub bazar_id: Option<Uuid>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/vendor-requests",
            get(list_requests).post(create_request),
        )
        .route("/v1/vendor-requests/{id}/accept", post(accept_request))
        .route("/v1/vendor-requests/{id}/reject", post(reject_request))
        .route("/v1/vendor-requests/{id}/cancel", post(cancel_request))
        .route("/v1/vendor-requests/{id}/pay", post(pay_request))
}

async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateVendorRequestBody>,
) -> Result<Json<VendorRequest>, AppError> {
    require_role(&claims, &[Role::Vendor])?;

    if body.people.is_empty() || body.people.len() > MAX_PEOPLE {
        return Err(AppError::Validation(format!(
            "people: expected between 1 and {MAX_PEOPLE} names, got {}",
            body.people.len()
        )));
    }
    if body.people.iter().any(|name| name.trim().is_empty()) {
        return Err(AppError::Validation(
            "people: names must not be blank".to_string(),
        ));
    }
    if body.is_bazar_booth {
        let bazar_id = body
            .bazar_id
            .ok_or_else(|| AppError::Validation("bazarId: required for bazar booths".to_string()))?;
        state
            .events
            .get(EventKind::Bazar, bazar_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("bazar {bazar_id} not found")))?;
    }

    let request = VendorRequest::new(
        claims.sub,
        body.people,
        body.booth_size,
        body.is_bazar_booth,
        body.bazar_id,
        body.duration,
        body.location,
    );
    state.vendor_requests.insert(&request).await?;
    Ok(Json(request))
}

/// Vendors see their own requests; the events office sees the pending queue.
async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<VendorRequest>>, AppError> {
    let requests = if claims.role.is_staff() {
        state
            .vendor_requests
            .list_by_status(RequestStatus::Pending)
            .await?
    } else if claims.role == Role::Vendor {
        state.vendor_requests.list_for_vendor(claims.sub).await?
    } else {
        return Err(AppError::Authorization(
            "students have no vendor requests".to_string(),
        ));
    };
    Ok(Json(requests))
}

async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VendorRequest>, AppError> {
    require_role(&claims, &[Role::EventsOffice, Role::Admin])?;
    let request = state.lifecycle.approve(id).await?;
    Ok(Json(request))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VendorRequest>, AppError> {
    require_role(&claims, &[Role::EventsOffice, Role::Admin])?;
    let request = state.lifecycle.reject(id).await?;
    Ok(Json(request))
}

async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VendorRequest>, AppError> {
    authorize_request_owner(&state, &claims, id).await?;
    let request = state.lifecycle.cancel(id, CancelOrigin::Vendor).await?;
    Ok(Json(request))
}

async fn pay_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VendorRequest>, AppError> {
    require_role(&claims, &[Role::Vendor])?;
    authorize_request_owner(&state, &claims, id).await?;
    let request = state.lifecycle.mark_paid(id).await?;
    Ok(Json(request))
}

/// The owning vendor may act on their request; staff may act on any.
async fn authorize_request_owner(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> Result<(), AppError> {
    if claims.role.is_staff() {
        return Ok(());
    }
    let request = state
        .vendor_requests
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vendor request {id} not found")))?;
    if request.vendor_id != claims.sub {
        return Err(AppError::Authorization(
            "this request belongs to another vendor".to_string(),
        ));
    }
    Ok(())
}
