use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cinetix_booking::SeatHold;
use cinetix_shared::events::{DomainEvent, SeatHeldEvent, SeatReleasedEvent};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHoldsRequest {
    pub screening_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub client_token: String,
    pub user_id: Option<Uuid>,
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HoldOwnerRequest {
    pub client_token: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HoldResponse {
    pub hold_id: Uuid,
    pub screening_id: Uuid,
    pub seat_id: Uuid,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<&SeatHold> for HoldResponse {
    fn from(hold: &SeatHold) -> Self {
        Self {
            hold_id: hold.id,
            screening_id: hold.screening_id,
            seat_id: hold.seat_id,
            expires_at: hold.expires_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_holds))
        .route("/v1/holds/{id}/heartbeat", post(heartbeat_hold))
        .route("/v1/holds/{id}/release", post(release_hold))
}

/// POST /v1/holds
/// Hold a batch of seats; all-or-nothing.
async fn create_holds(
    State(state): State<AppState>,
    Json(req): Json<CreateHoldsRequest>,
) -> Result<(StatusCode, Json<Vec<HoldResponse>>), AppError> {
    let holds = state
        .holds
        .create_holds(
            req.screening_id,
            &req.seat_ids,
            &req.client_token,
            req.user_id,
            req.ttl_seconds,
        )
        .await?;

    for hold in &holds {
        state.publish(DomainEvent::SeatHeld(SeatHeldEvent {
            screening_id: hold.screening_id,
            seat_id: hold.seat_id,
            hold_id: hold.id,
            held_at: hold.created_at.timestamp(),
            expires_at: hold.expires_at.timestamp(),
        }));
    }

    let body = holds.iter().map(HoldResponse::from).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /v1/holds/:id/heartbeat
async fn heartbeat_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    Json(req): Json<HoldOwnerRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    let hold = state
        .holds
        .extend_hold(hold_id, &req.client_token, req.user_id)
        .await?;
    Ok(Json(HoldResponse::from(&hold)))
}

/// POST /v1/holds/:id/release
async fn release_hold(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    Json(req): Json<HoldOwnerRequest>,
) -> Result<StatusCode, AppError> {
    let hold = state
        .holds
        .release_hold(hold_id, &req.client_token, req.user_id)
        .await?;
    state.publish(DomainEvent::SeatReleased(SeatReleasedEvent {
        screening_id: hold.screening_id,
        seat_id: hold.seat_id,
        hold_id: hold.id,
        released_at: chrono::Utc::now().timestamp(),
    }));
    Ok(StatusCode::NO_CONTENT)
}
