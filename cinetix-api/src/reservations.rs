use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use cinetix_booking::ReservationView;
use cinetix_shared::events::{DomainEvent, ReservationCreatedEvent};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub screening_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub client_token: String,
    pub member_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/reservations", post(create_reservation))
}

/// POST /v1/reservations
/// Turn the caller's active holds into a pending reservation group.
async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Vec<ReservationView>>), AppError> {
    let views = state
        .reservations
        .create_reservation(req.screening_id, &req.seat_ids, &req.client_token, req.member_id)
        .await?;

    if let Some(first) = views.first() {
        state.publish(DomainEvent::ReservationCreated(ReservationCreatedEvent {
            group_id: first.group_id,
            screening_id: first.screening_id,
            seat_ids: views.iter().map(|v| v.seat_id).collect(),
            expires_at: first.expires_at.timestamp(),
            timestamp: chrono::Utc::now().timestamp(),
        }));
    }

    Ok((StatusCode::CREATED, Json(views)))
}
