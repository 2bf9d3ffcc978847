use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};

use cinetix_sale::{PaymentStatus, SellTicketsRequest, SellTicketsResponse};
use cinetix_shared::events::{DomainEvent, TicketsSoldEvent};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/sales", post(sell_tickets))
}

/// POST /v1/sales
/// Direct or reservation-based sale. Declines come back 200 with a
/// Failed payment_status; the caller may retry with another card.
async fn sell_tickets(
    State(state): State<AppState>,
    Json(req): Json<SellTicketsRequest>,
) -> Result<(StatusCode, Json<SellTicketsResponse>), AppError> {
    let response = state.sales.sell_tickets(&req).await?;

    if response.payment_status == PaymentStatus::Succeeded {
        if let Some(payment_id) = response.payment_id {
            state.publish(DomainEvent::TicketsSold(TicketsSoldEvent {
                screening_id: req.screening_id,
                seat_ids: response.tickets.iter().map(|t| t.seat_id).collect(),
                payment_id,
                total_cents: response.total_after_cents,
                timestamp: chrono::Utc::now().timestamp(),
            }));
        }
        Ok((StatusCode::CREATED, Json(response)))
    } else {
        Ok((StatusCode::OK, Json(response)))
    }
}
